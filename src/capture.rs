//! Screenshot capture for one (device, resolution, browser) combination
//!
//! The resolution is applied as an exact CDP device-metrics override: captures
//! happen at the requested size, never at a maximized window, so the artifact
//! actually matches the resolution directory it lands in.

use crate::config::{Config, Resolution};
use crate::error::CaptureError;
use crate::layout::OutputLayout;
use crate::session::BrowserSession;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use std::path::PathBuf;
use tracing::info;

/// Resize the session to `resolution`, reload the capture target, wait for
/// load, and persist a timestamped PNG to the provisioned directory.
///
/// Returns the written path. Errors are per-combination: the caller logs them
/// and continues with the remaining resolutions.
pub async fn capture_screenshot(
    session: &BrowserSession,
    config: &Config,
    layout: &OutputLayout,
    device: &str,
    resolution: Resolution,
) -> Result<PathBuf, CaptureError> {
    apply_resolution(session, resolution).await?;

    session
        .open_capture_target(&config.sitemap_url, config.page_load_timeout)
        .await?;

    let params = ScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Png)
        .build();

    let png_data = session
        .page()
        .screenshot(params)
        .await
        .map_err(|e| CaptureError::CaptureFailure(e.to_string()))?;

    let path = layout.screenshot_path(device, resolution, session.kind());
    tokio::fs::write(&path, &png_data).await?;

    info!("Screenshot saved at {}", path.display());
    Ok(path)
}

/// Apply an exact viewport resolution via CDP device-metrics override
async fn apply_resolution(
    session: &BrowserSession,
    resolution: Resolution,
) -> Result<(), CaptureError> {
    let params = SetDeviceMetricsOverrideParams::builder()
        .width(resolution.width as i64)
        .height(resolution.height as i64)
        .device_scale_factor(1.0)
        .mobile(false)
        .build()
        .map_err(CaptureError::CaptureFailure)?;

    session
        .page()
        .execute(params)
        .await
        .map_err(|e| CaptureError::CaptureFailure(e.to_string()))?;

    Ok(())
}
