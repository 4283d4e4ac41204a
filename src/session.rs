//! Browser session management
//!
//! One [`BrowserSession`] is a single launched engine instance scoped to a
//! teardown obligation: launch, navigate, wait for the document root, and close
//! on every exit path. Sessions are never pooled or reused across browsers; the
//! pipeline drives exactly one at a time.

use crate::config::{create_browser_config, BrowserKind, Config};
use crate::error::CaptureError;
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info};

const DOCUMENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A launched, navigable browser instance
pub struct BrowserSession {
    kind: BrowserKind,
    browser: Browser,
    handler: tokio::task::JoinHandle<()>,
    page: Page,
}

impl BrowserSession {
    /// Launch the engine with a resolved executable and open a blank page.
    ///
    /// The CDP event handler is a stream that must be polled for the browser to
    /// make progress; it runs on a background task until the browser closes.
    pub async fn launch(
        config: &Config,
        kind: BrowserKind,
        executable: &Path,
    ) -> Result<Self, CaptureError> {
        info!("Launching {} from {}", kind, executable.display());

        let browser_config = create_browser_config(config, executable)?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CaptureError::LaunchFailure(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {}", e);
                }
            }
            debug!("CDP handler stream ended");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CaptureError::LaunchFailure(e.to_string()))?;

        Ok(Self {
            kind,
            browser,
            handler: handler_task,
            page,
        })
    }

    pub fn kind(&self) -> BrowserKind {
        self.kind
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Navigate to the capture target and block until the document root is
    /// present or the page-load timeout elapses.
    pub async fn open_capture_target(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<(), CaptureError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| CaptureError::CaptureFailure(format!("navigation to {url} failed: {e}")))?;

        self.wait_for_document(timeout).await
    }

    /// Poll for the document root element until it appears or the deadline passes
    pub async fn wait_for_document(&self, timeout: Duration) -> Result<(), CaptureError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element("html").await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(CaptureError::NavigationTimeout(timeout));
            }
            sleep(DOCUMENT_POLL_INTERVAL).await;
        }
    }

    /// Tear the session down: page, browser process, handler task.
    ///
    /// Best-effort on every step; the pipeline calls this on all exit paths.
    pub async fn close(mut self) {
        let _ = self.page.close().await;
        let _ = self.browser.close().await;
        self.handler.abort();
        debug!("{} session closed", self.kind);
    }
}
