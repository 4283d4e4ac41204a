//! Output directory provisioning and artifact paths
//!
//! Owns the on-disk layout:
//! `output_dir/<Device>/<WxH>/<Browser>/Screenshot-<YYYYMMDD_HHMMSS>.png` for
//! screenshots and `<Browser>_test_run_<YYYYMMDD_HHMMSS>.avi` for recordings.
//! Timestamps have second granularity; two captures of the same combination in
//! the same second overwrite rather than append.

use crate::config::{BrowserKind, Config, Resolution};
use crate::error::CaptureError;
use chrono::Local;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Paths for one capture run, rooted at the configured output directory
#[derive(Debug, Clone)]
pub struct OutputLayout {
    output_dir: PathBuf,
    video_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            video_dir: config.video_dir.clone(),
        }
    }

    /// Create the directory for every (device, resolution, browser) triple.
    /// Idempotent: re-running over an existing tree is not an error.
    pub fn provision(&self, config: &Config) -> Result<(), CaptureError> {
        for device in &config.devices {
            for resolution in &device.resolutions {
                for browser in &config.browsers {
                    let dir = self.combination_dir(&device.name, *resolution, browser.kind);
                    std::fs::create_dir_all(&dir)?;
                }
            }
        }
        Ok(())
    }

    /// Directory holding screenshots for one combination
    pub fn combination_dir(
        &self,
        device: &str,
        resolution: Resolution,
        browser: BrowserKind,
    ) -> PathBuf {
        self.output_dir
            .join(device)
            .join(resolution.to_string())
            .join(browser.label())
    }

    /// Full path for a screenshot taken now
    pub fn screenshot_path(
        &self,
        device: &str,
        resolution: Resolution,
        browser: BrowserKind,
    ) -> PathBuf {
        self.combination_dir(device, resolution, browser)
            .join(format!("Screenshot-{}.png", timestamp()))
    }

    /// Full path for a session recording started now
    pub fn video_path(&self, browser: BrowserKind) -> PathBuf {
        self.video_dir
            .join(format!("{}_test_run_{}.avi", browser.label(), timestamp()))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Second-granularity timestamp used in every artifact name
pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
