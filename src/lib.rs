//! # Visual Capture
//!
//! A visual regression capture tool: drives browser engines across a
//! device/resolution matrix, loads a sitemap page, saves timestamped
//! screenshots into a structured directory tree, and records a video of each
//! browser session.
//!
//! The pipeline is strictly sequential — provision the output tree once, then
//! for each browser, for each device category: launch one session, record it,
//! capture one screenshot per resolution, tear the session down. Failures are
//! isolated per screenshot and per session; a broken combination never stops
//! the rest of the matrix.
//!
//! ## Output layout
//!
//! ```text
//! screenshots/<Device>/<WxH>/<Browser>/Screenshot-<YYYYMMDD_HHMMSS>.png
//! <Browser>_test_run_<YYYYMMDD_HHMMSS>.avi
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use visual_capture::{Config, Pipeline, SystemResolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let pipeline = Pipeline::new(config, Arc::new(SystemResolver::new()))?;
//!     let summary = pipeline.run().await?;
//!     println!("{} screenshots captured", summary.screenshots_captured);
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Full matrix with defaults
//! visual-capture
//!
//! # Override the capture target and output root
//! visual-capture --url https://example.com/sitemap.xml --output-dir shots
//! ```
//!
//! Recording requires a system `ffmpeg`; a missing binary fails the affected
//! session, not the run.

/// Configuration tables for the capture matrix
pub mod config;

/// Error types for the capture pipeline
pub mod error;

/// Browser executable resolution
pub mod resolver;

/// Browser session lifecycle
pub mod session;

/// Output directory provisioning and artifact paths
pub mod layout;

/// Screenshot capture per combination
pub mod capture;

/// Session recording and video encoding
pub mod recorder;

/// Sequential pipeline orchestration
pub mod pipeline;

/// Command-line interface implementation
pub mod cli;


pub use capture::*;
pub use cli::*;
pub use config::*;
pub use error::*;
pub use layout::*;
pub use pipeline::*;
pub use recorder::*;
pub use resolver::*;
pub use session::*;
