//! Configuration management with serde serialization/deserialization
//!
//! This module provides all configuration structures for the capture pipeline:
//! the device/resolution tables, browser targets, capture target, and recording
//! settings. The whole table set is explicit data passed into the pipeline entry
//! point, so tests can substitute fake browser targets without touching a real
//! installation.

use crate::error::CaptureError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration for a capture run
///
/// Carries the static tables the pipeline iterates: device categories with their
/// resolutions, the browser engines to drive, the capture target, and output
/// locations.
///
/// # Examples
///
/// ```rust
/// use visual_capture::Config;
///
/// // Defaults match the documented capture matrix
/// let config = Config::default();
/// assert_eq!(config.devices.len(), 2);
///
/// let config = Config {
///     output_dir: "shots".into(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Root of the screenshot directory tree (default: `screenshots`)
    pub output_dir: PathBuf,

    /// Directory for session recordings (default: working directory)
    pub video_dir: PathBuf,

    /// Capture target loaded before every screenshot and recording
    pub sitemap_url: String,

    /// Timeout for the document root to appear after navigation (default: 30s)
    pub page_load_timeout: Duration,

    /// Unconditional settle delay after load, before recording (default: 5s)
    pub settle_delay: Duration,

    /// Device categories and their ordered resolution lists
    pub devices: Vec<DeviceProfile>,

    /// Browser engines to drive, in order
    pub browsers: Vec<BrowserTarget>,

    /// Session recording parameters
    pub recording: RecordingSettings,

    /// Window size the session launches with, before any per-resolution override
    pub viewport: Viewport,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("screenshots"),
            video_dir: PathBuf::from("."),
            sitemap_url: "https://www.getcalley.com/page-sitemap.xml".to_string(),
            page_load_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(5),
            devices: vec![
                DeviceProfile {
                    name: "Desktop".to_string(),
                    resolutions: vec![
                        Resolution::new(1920, 1080),
                        Resolution::new(1366, 768),
                        Resolution::new(1536, 864),
                    ],
                },
                DeviceProfile {
                    name: "Mobile".to_string(),
                    resolutions: vec![
                        Resolution::new(360, 640),
                        Resolution::new(414, 896),
                        Resolution::new(375, 667),
                    ],
                },
            ],
            browsers: vec![
                BrowserTarget::new(BrowserKind::Chrome),
                BrowserTarget::new(BrowserKind::Chromium),
            ],
            recording: RecordingSettings::default(),
            viewport: Viewport::default(),
        }
    }
}

impl Config {
    /// Validate the tables before a run. Errors here are process-level: the
    /// pipeline never starts with a configuration it cannot iterate.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.devices.is_empty() {
            return Err(CaptureError::ConfigurationError(
                "at least one device category is required".to_string(),
            ));
        }
        if self.devices.iter().any(|d| d.resolutions.is_empty()) {
            return Err(CaptureError::ConfigurationError(
                "every device category needs at least one resolution".to_string(),
            ));
        }
        if self.browsers.is_empty() {
            return Err(CaptureError::ConfigurationError(
                "at least one browser target is required".to_string(),
            ));
        }
        match url::Url::parse(&self.sitemap_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                return Err(CaptureError::ConfigurationError(format!(
                    "capture target is not an http(s) URL: {}",
                    self.sitemap_url
                )))
            }
        }
        if self.page_load_timeout.is_zero() {
            return Err(CaptureError::ConfigurationError(
                "page load timeout must be greater than 0".to_string(),
            ));
        }
        if self.recording.frame_rate == 0 {
            return Err(CaptureError::ConfigurationError(
                "recording frame rate must be greater than 0".to_string(),
            ));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(CaptureError::ConfigurationError(
                "viewport dimensions must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// A logical device grouping mapping to a set of test resolutions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceProfile {
    /// Category label used in the output tree (e.g. "Desktop")
    pub name: String,
    /// Ordered resolutions captured for this category
    pub resolutions: Vec<Resolution>,
}

/// A `WIDTHxHEIGHT` test resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CaptureError::InvalidResolution(s.to_string());
        let (w, h) = s.split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

/// Browser engines the pipeline can drive
///
/// Both variants speak the Chrome DevTools Protocol; they differ in which
/// executable the driver resolver looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum BrowserKind {
    Chrome,
    Chromium,
}

impl BrowserKind {
    /// Label used in artifact paths and logs
    pub fn label(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "Chrome",
            BrowserKind::Chromium => "Chromium",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One browser engine entry in the capture matrix
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserTarget {
    pub kind: BrowserKind,

    /// Explicit executable path, bypassing the driver resolver's search
    pub executable: Option<PathBuf>,
}

impl BrowserTarget {
    pub fn new(kind: BrowserKind) -> Self {
        Self {
            kind,
            executable: None,
        }
    }
}

/// Session recording parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordingSettings {
    /// Wall-clock recording length per session (default: 60s)
    pub duration: Duration,

    /// Target frame rate; a best-effort pace, not a guarantee (default: 20)
    pub frame_rate: u32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60),
            frame_rate: 20,
        }
    }
}

/// Browser window size a session launches with
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Generate CDP launch arguments for a session
///
/// Headless operation with per-launch unique user-data directories so two
/// sequential sessions never collide on Chrome's profile singleton.
pub fn get_launch_args(config: &Config) -> Vec<String> {
    let unique_id = format!("{}-{}", std::process::id(), uuid::Uuid::new_v4());

    vec![
        "--headless".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--disable-extensions".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-sync".to_string(),
        "--no-first-run".to_string(),
        "--hide-scrollbars".to_string(),
        "--ignore-certificate-errors".to_string(),
        format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        ),
        format!("--user-data-dir=/tmp/visual-capture-{unique_id}"),
    ]
}

/// Build the chromiumoxide launch configuration for a resolved executable
pub fn create_browser_config(
    config: &Config,
    executable: &std::path::Path,
) -> Result<chromiumoxide::browser::BrowserConfig, CaptureError> {
    chromiumoxide::browser::BrowserConfig::builder()
        .chrome_executable(executable)
        .window_size(config.viewport.width, config.viewport.height)
        .args(get_launch_args(config))
        .build()
        .map_err(CaptureError::LaunchFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capture_matrix() {
        let config = Config::default();
        assert_eq!(config.devices.len(), 2);
        assert_eq!(config.devices[0].name, "Desktop");
        assert_eq!(config.devices[0].resolutions[0], Resolution::new(1920, 1080));
        assert_eq!(config.devices[1].name, "Mobile");
        assert_eq!(config.devices[1].resolutions.len(), 3);
        assert_eq!(config.browsers.len(), 2);
        assert_eq!(config.page_load_timeout, Duration::from_secs(30));
        assert_eq!(config.settle_delay, Duration::from_secs(5));
        assert_eq!(config.recording.duration, Duration::from_secs(60));
        assert_eq!(config.recording.frame_rate, 20);
    }

    #[test]
    fn resolution_parse_and_display() {
        let res: Resolution = "1366x768".parse().unwrap();
        assert_eq!(res, Resolution::new(1366, 768));
        assert_eq!(res.to_string(), "1366x768");

        assert!("1366".parse::<Resolution>().is_err());
        assert!("x768".parse::<Resolution>().is_err());
        assert!("ax b".parse::<Resolution>().is_err());
        assert!("0x768".parse::<Resolution>().is_err());
    }

    #[test]
    fn validate_rejects_empty_tables() {
        let mut config = Config::default();
        config.devices.clear();
        assert!(matches!(
            config.validate(),
            Err(CaptureError::ConfigurationError(_))
        ));

        let mut config = Config::default();
        config.browsers.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sitemap_url = "ftp://example.com/sitemap.xml".to_string();
        assert!(config.validate().is_err());

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn config_json_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.devices.len(), config.devices.len());
        assert_eq!(back.sitemap_url, config.sitemap_url);
        assert_eq!(back.recording.duration, config.recording.duration);
    }

    #[test]
    fn launch_args_generation() {
        let config = Config::default();
        let args = get_launch_args(&config);

        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        )));

        // Two launches must not share a user-data directory
        let again = get_launch_args(&config);
        let dir = |v: &[String]| {
            v.iter()
                .find(|a| a.starts_with("--user-data-dir"))
                .cloned()
                .unwrap()
        };
        assert_ne!(dir(&args), dir(&again));
    }
}
