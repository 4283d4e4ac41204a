//! Driver resolution for browser executables
//!
//! The pipeline never installs or downloads anything: it asks a [`DriverResolver`]
//! where the engine's executable lives. The production resolver checks an explicit
//! override, then environment variables, then the usual install locations. Tests
//! inject [`FixedResolver`] instead of touching a real installation.

use crate::config::{BrowserKind, BrowserTarget};
use crate::error::CaptureError;
use std::path::{Path, PathBuf};

/// Capability interface for locating a browser executable
pub trait DriverResolver: Send + Sync {
    fn resolve(&self, target: &BrowserTarget) -> Result<PathBuf, CaptureError>;
}

/// Resolver backed by the host system
///
/// Resolution order: the target's explicit `executable`, then the engine's
/// environment variable, then a per-engine candidate list.
#[derive(Debug, Default)]
pub struct SystemResolver;

impl SystemResolver {
    pub fn new() -> Self {
        Self
    }

    fn env_var(kind: BrowserKind) -> &'static str {
        match kind {
            BrowserKind::Chrome => "CHROME_BIN",
            BrowserKind::Chromium => "CHROMIUM_BIN",
        }
    }

    fn candidates(kind: BrowserKind) -> &'static [&'static str] {
        match kind {
            BrowserKind::Chrome => &[
                "/usr/bin/google-chrome",
                "/usr/bin/google-chrome-stable",
                "/opt/google/chrome/chrome",
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            ],
            BrowserKind::Chromium => &[
                "/usr/bin/chromium",
                "/usr/bin/chromium-browser",
                "/usr/sbin/chromium",
                "/snap/bin/chromium",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
            ],
        }
    }

    fn usable(path: &Path) -> bool {
        path.is_file()
    }
}

impl DriverResolver for SystemResolver {
    fn resolve(&self, target: &BrowserTarget) -> Result<PathBuf, CaptureError> {
        if let Some(explicit) = &target.executable {
            if Self::usable(explicit) {
                return Ok(explicit.clone());
            }
            return Err(CaptureError::LaunchFailure(format!(
                "{}: configured executable not found: {}",
                target.kind,
                explicit.display()
            )));
        }

        if let Ok(from_env) = std::env::var(Self::env_var(target.kind)) {
            let path = PathBuf::from(from_env);
            if Self::usable(&path) {
                return Ok(path);
            }
        }

        for candidate in Self::candidates(target.kind) {
            let path = Path::new(candidate);
            if Self::usable(path) {
                return Ok(path.to_path_buf());
            }
        }

        Err(CaptureError::LaunchFailure(format!(
            "{}: no executable found on this system",
            target.kind
        )))
    }
}

/// Test resolver returning a fixed answer per engine
pub struct FixedResolver {
    chrome: Result<PathBuf, CaptureError>,
    chromium: Result<PathBuf, CaptureError>,
}

impl FixedResolver {
    pub fn new(
        chrome: Result<PathBuf, CaptureError>,
        chromium: Result<PathBuf, CaptureError>,
    ) -> Self {
        Self { chrome, chromium }
    }

    /// Resolver that fails for every engine
    pub fn unavailable() -> Self {
        let missing = |kind: BrowserKind| {
            Err(CaptureError::LaunchFailure(format!(
                "{kind}: not installed"
            )))
        };
        Self {
            chrome: missing(BrowserKind::Chrome),
            chromium: missing(BrowserKind::Chromium),
        }
    }
}

impl DriverResolver for FixedResolver {
    fn resolve(&self, target: &BrowserTarget) -> Result<PathBuf, CaptureError> {
        match target.kind {
            BrowserKind::Chrome => self.chrome.clone(),
            BrowserKind::Chromium => self.chromium.clone(),
        }
    }
}
