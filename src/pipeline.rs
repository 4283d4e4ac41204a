//! Sequential capture pipeline
//!
//! One run: provision the output tree once, then for each browser target, for
//! each device category, launch a session, settle, record the session, capture
//! one screenshot per resolution, and tear the session down. Everything is
//! strictly sequential.
//!
//! Two failure boundaries, both non-fatal to the run:
//! - per screenshot: log the failing combination, continue with the next
//!   resolution;
//! - per browser×device session: log the browser, close the session, continue
//!   with the next iteration.

use crate::capture::capture_screenshot;
use crate::config::{BrowserKind, BrowserTarget, Config, DeviceProfile, Resolution};
use crate::error::CaptureError;
use crate::layout::OutputLayout;
use crate::recorder::{FfmpegEncoder, PageFrameSource, ScreenRecorder};
use crate::resolver::DriverResolver;
use crate::session::BrowserSession;
use futures::future::LocalBoxFuture;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{info, warn};

/// Outcome counters for one pipeline run
///
/// Handled failures are visible here rather than in the process exit code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sessions_attempted: usize,
    pub sessions_failed: usize,
    pub screenshots_captured: usize,
    pub screenshots_failed: usize,
    pub recordings_completed: usize,
}

/// The capture pipeline entry point
///
/// Configuration and the driver resolver are injected; nothing here reaches for
/// process-wide state or installs anything.
pub struct Pipeline {
    config: Config,
    layout: OutputLayout,
    resolver: Arc<dyn DriverResolver>,
}

impl Pipeline {
    pub fn new(config: Config, resolver: Arc<dyn DriverResolver>) -> Result<Self, CaptureError> {
        config.validate()?;
        let layout = OutputLayout::new(&config);
        Ok(Self {
            config,
            layout,
            resolver,
        })
    }

    /// Run the full capture matrix.
    ///
    /// Returns `Err` only for process-level failures (directory provisioning);
    /// every in-matrix failure is logged, counted, and skipped past.
    pub async fn run(&self) -> Result<RunSummary, CaptureError> {
        self.layout.provision(&self.config)?;
        info!(
            "Output tree provisioned under {}",
            self.layout.output_dir().display()
        );

        let mut summary = RunSummary::default();

        for target in &self.config.browsers {
            for device in &self.config.devices {
                summary.sessions_attempted += 1;
                if let Err(e) = self.run_session(target, device, &mut summary).await {
                    summary.sessions_failed += 1;
                    warn!("Error in {} ({}): {}", target.kind, device.name, e);
                }
            }
        }

        info!(
            "Run complete: {}/{} sessions ok, {} screenshots captured ({} failed), {} recordings",
            summary.sessions_attempted - summary.sessions_failed,
            summary.sessions_attempted,
            summary.screenshots_captured,
            summary.screenshots_failed,
            summary.recordings_completed,
        );
        Ok(summary)
    }

    /// One browser×device session, with guaranteed teardown on every path
    async fn run_session(
        &self,
        target: &BrowserTarget,
        device: &DeviceProfile,
        summary: &mut RunSummary,
    ) -> Result<(), CaptureError> {
        let executable = self.resolver.resolve(target)?;
        let session = BrowserSession::launch(&self.config, target.kind, &executable).await?;

        let result = self.drive_session(&session, device, summary).await;
        session.close().await;
        result
    }

    async fn drive_session(
        &self,
        session: &BrowserSession,
        device: &DeviceProfile,
        summary: &mut RunSummary,
    ) -> Result<(), CaptureError> {
        session
            .open_capture_target(&self.config.sitemap_url, self.config.page_load_timeout)
            .await?;

        // Let late-loading content finish before the recording starts
        sleep(self.config.settle_delay).await;

        self.record_session(session).await?;
        summary.recordings_completed += 1;

        capture_resolutions(device, session.kind(), summary, |resolution| {
            Box::pin(capture_screenshot(
                session,
                &self.config,
                &self.layout,
                &device.name,
                resolution,
            ))
        })
        .await;

        Ok(())
    }

    async fn record_session(&self, session: &BrowserSession) -> Result<(), CaptureError> {
        let path = self.layout.video_path(session.kind());
        let width = self.config.viewport.width;
        let height = self.config.viewport.height;
        let frame_rate = self.config.recording.frame_rate;

        let mut encoder = FfmpegEncoder::spawn(&path, width, height, frame_rate)?;
        let mut source = PageFrameSource::new(session.page().clone());
        let recorder = ScreenRecorder::new(frame_rate, width, height);

        recorder
            .record(
                &mut source,
                &mut encoder,
                self.config.recording.duration,
                None,
            )
            .await?;

        Ok(())
    }
}

/// The per-screenshot failure boundary: one capture attempt per resolution,
/// failures logged and counted, the remaining resolutions always attempted.
///
/// The capture itself is injected, so the boundary is testable without a live
/// session.
async fn capture_resolutions<'a, F>(
    device: &'a DeviceProfile,
    browser: BrowserKind,
    summary: &mut RunSummary,
    mut capture: F,
) where
    F: FnMut(Resolution) -> LocalBoxFuture<'a, Result<PathBuf, CaptureError>>,
{
    for resolution in &device.resolutions {
        match capture(*resolution).await {
            Ok(_) => summary.screenshots_captured += 1,
            Err(e) => {
                summary.screenshots_failed += 1;
                warn!(
                    "Error capturing screenshot for {} at {} on {}: {}",
                    device.name, resolution, browser, e
                );
            }
        }
    }
}
