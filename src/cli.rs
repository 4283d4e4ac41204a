use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line interface
///
/// Running with no arguments executes the full capture matrix with the default
/// configuration; every flag is an optional override applied after the config
/// file loads.
#[derive(Parser)]
#[command(name = "visual-capture")]
#[command(about = "Visual regression capture across browsers, devices, and resolutions")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[arg(long, help = "Configuration file path (JSON)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Screenshot output directory")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, help = "Directory for session recordings")]
    pub video_dir: Option<PathBuf>,

    #[arg(long, help = "Capture target URL")]
    pub url: Option<String>,

    #[arg(long, help = "Recording duration in seconds")]
    pub record_duration: Option<u64>,

    #[arg(long, help = "Page load timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Browser executable path applied to every target")]
    pub browser_path: Option<PathBuf>,

    #[arg(long, help = "Enable verbose logging")]
    pub verbose: bool,
}

impl Cli {
    /// Apply CLI overrides on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(video_dir) = &self.video_dir {
            config.video_dir = video_dir.clone();
        }
        if let Some(url) = &self.url {
            config.sitemap_url = url.clone();
        }
        if let Some(duration) = self.record_duration {
            config.recording.duration = Duration::from_secs(duration);
        }
        if let Some(timeout) = self.timeout {
            config.page_load_timeout = Duration::from_secs(timeout);
        }
        if let Some(path) = &self.browser_path {
            for target in &mut config.browsers {
                target.executable = Some(path.clone());
            }
        }
    }
}

pub fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    Ok(())
}
