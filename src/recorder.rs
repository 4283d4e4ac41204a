//! Session recording
//!
//! A recording is a wall-clock loop: grab a frame, convert it for the encoder,
//! append it, and stop only once elapsed time strictly exceeds the requested
//! duration. Frames come from a [`FrameSource`] (production: the live session's
//! viewport over CDP) and land in a [`VideoSink`] (production: raw rgb24 frames
//! streamed into a spawned `ffmpeg` writing an AVI container). Both seams take
//! fakes so the loop's timing contract is testable without a browser or ffmpeg.

use crate::error::CaptureError;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::time::sleep;
use tracing::{debug, info};

/// Bounding region within a grabbed frame, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Source of raw RGBA frames
#[async_trait]
pub trait FrameSource: Send {
    async fn grab(&mut self) -> Result<RgbaImage, CaptureError>;
}

/// Destination for encoder-ready rgb24 frames
#[async_trait]
pub trait VideoSink: Send {
    async fn write_frame(&mut self, rgb: &[u8]) -> Result<(), CaptureError>;

    /// Finalize and close the container
    async fn finish(&mut self) -> Result<(), CaptureError>;

    /// Discard the recording: stop the encoder and clean up partial output.
    /// Called instead of `finish` when the recording fails mid-loop.
    async fn abort(&mut self);
}

/// Counters for one completed recording
#[derive(Debug, Clone, Copy)]
pub struct RecordingStats {
    pub frames: usize,
    pub elapsed: Duration,
}

/// Duration-bounded frame-capture loop at a best-effort fixed rate
pub struct ScreenRecorder {
    frame_rate: u32,
    frame_width: u32,
    frame_height: u32,
}

impl ScreenRecorder {
    /// `frame_width`/`frame_height` are the sink's fixed frame dimensions;
    /// grabbed frames are cropped and scaled to match.
    pub fn new(frame_rate: u32, frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_rate,
            frame_width,
            frame_height,
        }
    }

    /// Record until elapsed wall-clock time strictly exceeds `duration`.
    ///
    /// No exact frame-count guarantee: pacing is wall-clock polling, and a slow
    /// source simply yields fewer frames. The sink is finalized before return.
    pub async fn record<S, K>(
        &self,
        source: &mut S,
        sink: &mut K,
        duration: Duration,
        region: Option<CaptureRegion>,
    ) -> Result<RecordingStats, CaptureError>
    where
        S: FrameSource,
        K: VideoSink,
    {
        let frame_interval = Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)));
        let start = Instant::now();
        let mut frames = 0usize;

        loop {
            let frame = match source.grab().await {
                Ok(frame) => frame,
                Err(e) => {
                    sink.abort().await;
                    return Err(e);
                }
            };
            let rgb = self.prepare_frame(frame, region);
            if let Err(e) = sink.write_frame(&rgb).await {
                sink.abort().await;
                return Err(e);
            }
            frames += 1;

            if start.elapsed() > duration {
                break;
            }

            let next_due = frame_interval * frames as u32;
            if let Some(pause) = next_due.checked_sub(start.elapsed()) {
                sleep(pause).await;
            }
        }

        sink.finish().await?;

        let stats = RecordingStats {
            frames,
            elapsed: start.elapsed(),
        };
        debug!(
            "Recording finished: {} frames in {:?}",
            stats.frames, stats.elapsed
        );
        Ok(stats)
    }

    /// Crop to the region, scale to the sink's frame size, and drop the alpha
    /// channel: encoders consume packed rgb24.
    fn prepare_frame(&self, frame: RgbaImage, region: Option<CaptureRegion>) -> Vec<u8> {
        let cropped = match region {
            Some(r) => {
                let x = r.x.min(frame.width().saturating_sub(1));
                let y = r.y.min(frame.height().saturating_sub(1));
                let w = r.width.min(frame.width() - x).max(1);
                let h = r.height.min(frame.height() - y).max(1);
                image::imageops::crop_imm(&frame, x, y, w, h).to_image()
            }
            None => frame,
        };

        let sized = if cropped.dimensions() == (self.frame_width, self.frame_height) {
            cropped
        } else {
            image::imageops::resize(
                &cropped,
                self.frame_width,
                self.frame_height,
                FilterType::Triangle,
            )
        };

        DynamicImage::ImageRgba8(sized).to_rgb8().into_raw()
    }
}

/// Frame source grabbing the live session's viewport over CDP
pub struct PageFrameSource {
    page: Page,
}

impl PageFrameSource {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl FrameSource for PageFrameSource {
    async fn grab(&mut self) -> Result<RgbaImage, CaptureError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let png_data = self
            .page
            .screenshot(params)
            .await
            .map_err(|e| CaptureError::CaptureFailure(e.to_string()))?;

        let decoded = image::load_from_memory(&png_data)
            .map_err(|e| CaptureError::CaptureFailure(e.to_string()))?;

        Ok(decoded.to_rgba8())
    }
}

/// Video sink wrapping a spawned system `ffmpeg` process
///
/// Raw rgb24 frames stream into ffmpeg's stdin; the container is AVI with
/// MPEG-4 part 2 video. A missing binary or a nonzero exit is an
/// `EncodingFailure` for the session, never a process failure.
pub struct FfmpegEncoder {
    child: Child,
    stdin: Option<ChildStdin>,
    output: PathBuf,
}

impl FfmpegEncoder {
    pub fn spawn(
        output: &Path,
        width: u32,
        height: u32,
        frame_rate: u32,
    ) -> Result<Self, CaptureError> {
        let mut child = Command::new("ffmpeg")
            .arg("-y")
            .arg("-loglevel")
            .arg("error")
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("rgb24")
            .arg("-s")
            .arg(format!("{width}x{height}"))
            .arg("-r")
            .arg(frame_rate.to_string())
            .arg("-i")
            .arg("-")
            .arg("-c:v")
            .arg("mpeg4")
            .arg("-q:v")
            .arg("5")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CaptureError::EncodingFailure(format!("failed to spawn ffmpeg: {e}")))?;

        let stdin = child.stdin.take();

        Ok(Self {
            child,
            stdin,
            output: output.to_path_buf(),
        })
    }
}

#[async_trait]
impl VideoSink for FfmpegEncoder {
    async fn write_frame(&mut self, rgb: &[u8]) -> Result<(), CaptureError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CaptureError::EncodingFailure("encoder already finished".to_string()))?;

        stdin
            .write_all(rgb)
            .await
            .map_err(|e| CaptureError::EncodingFailure(e.to_string()))
    }

    async fn finish(&mut self) -> Result<(), CaptureError> {
        // Closing stdin signals end of stream; ffmpeg finalizes the container.
        drop(self.stdin.take());

        let status = self
            .child
            .wait()
            .await
            .map_err(|e| CaptureError::EncodingFailure(e.to_string()))?;

        if !status.success() {
            let _ = tokio::fs::remove_file(&self.output).await;
            return Err(CaptureError::EncodingFailure(format!(
                "ffmpeg exited with {status}"
            )));
        }

        info!("Video saved at {}", self.output.display());
        Ok(())
    }

    async fn abort(&mut self) {
        drop(self.stdin.take());
        let _ = self.child.kill().await;
        let _ = tokio::fs::remove_file(&self.output).await;
        debug!("Recording aborted, removed {}", self.output.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SolidFrames {
        width: u32,
        height: u32,
        pixel: image::Rgba<u8>,
        grabs: usize,
    }

    #[async_trait]
    impl FrameSource for SolidFrames {
        async fn grab(&mut self) -> Result<RgbaImage, CaptureError> {
            self.grabs += 1;
            Ok(RgbaImage::from_pixel(self.width, self.height, self.pixel))
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        frames: Vec<Vec<u8>>,
        finished: bool,
        aborted: bool,
        fail_after: Option<usize>,
    }

    #[async_trait]
    impl VideoSink for CollectingSink {
        async fn write_frame(&mut self, rgb: &[u8]) -> Result<(), CaptureError> {
            if self.fail_after == Some(self.frames.len()) {
                return Err(CaptureError::EncodingFailure("broken pipe".to_string()));
            }
            self.frames.push(rgb.to_vec());
            Ok(())
        }

        async fn finish(&mut self) -> Result<(), CaptureError> {
            self.finished = true;
            Ok(())
        }

        async fn abort(&mut self) {
            self.aborted = true;
        }
    }

    #[tokio::test]
    async fn recording_runs_past_requested_duration() {
        let recorder = ScreenRecorder::new(50, 8, 8);
        let mut source = SolidFrames {
            width: 8,
            height: 8,
            pixel: image::Rgba([10, 20, 30, 255]),
            grabs: 0,
        };
        let mut sink = CollectingSink::default();

        let duration = Duration::from_millis(100);
        let stats = recorder
            .record(&mut source, &mut sink, duration, None)
            .await
            .unwrap();

        assert!(stats.elapsed > duration);
        assert!(stats.frames >= 1);
        assert_eq!(source.grabs, stats.frames);
        assert_eq!(sink.frames.len(), stats.frames);
        assert!(sink.finished);
    }

    #[tokio::test]
    async fn frames_are_packed_rgb24() {
        let recorder = ScreenRecorder::new(100, 4, 4);
        let mut source = SolidFrames {
            width: 4,
            height: 4,
            pixel: image::Rgba([1, 2, 3, 255]),
            grabs: 0,
        };
        let mut sink = CollectingSink::default();

        recorder
            .record(&mut source, &mut sink, Duration::from_millis(1), None)
            .await
            .unwrap();

        let frame = &sink.frames[0];
        assert_eq!(frame.len(), 4 * 4 * 3);
        assert_eq!(&frame[..3], &[1, 2, 3]);
    }

    #[tokio::test]
    async fn region_crop_respects_sink_dimensions() {
        let recorder = ScreenRecorder::new(100, 10, 10);
        let mut source = SolidFrames {
            width: 64,
            height: 64,
            pixel: image::Rgba([200, 100, 50, 255]),
            grabs: 0,
        };
        let mut sink = CollectingSink::default();

        let region = CaptureRegion {
            x: 4,
            y: 4,
            width: 10,
            height: 10,
        };
        recorder
            .record(&mut source, &mut sink, Duration::from_millis(1), Some(region))
            .await
            .unwrap();

        assert_eq!(sink.frames[0].len(), 10 * 10 * 3);
    }

    #[tokio::test]
    async fn source_failure_aborts_sink() {
        struct FailingSource;

        #[async_trait]
        impl FrameSource for FailingSource {
            async fn grab(&mut self) -> Result<RgbaImage, CaptureError> {
                Err(CaptureError::CaptureFailure("page gone".to_string()))
            }
        }

        let recorder = ScreenRecorder::new(20, 8, 8);
        let mut sink = CollectingSink::default();
        let result = recorder
            .record(
                &mut FailingSource,
                &mut sink,
                Duration::from_millis(50),
                None,
            )
            .await;

        // A failed recording is discarded, never finalized
        assert!(matches!(result, Err(CaptureError::CaptureFailure(_))));
        assert!(sink.aborted);
        assert!(!sink.finished);
    }

    #[tokio::test]
    async fn sink_failure_aborts_encoder() {
        let recorder = ScreenRecorder::new(100, 8, 8);
        let mut source = SolidFrames {
            width: 8,
            height: 8,
            pixel: image::Rgba([0, 0, 0, 255]),
            grabs: 0,
        };
        let mut sink = CollectingSink {
            fail_after: Some(0),
            ..Default::default()
        };

        let result = recorder
            .record(&mut source, &mut sink, Duration::from_millis(50), None)
            .await;

        assert!(matches!(result, Err(CaptureError::EncodingFailure(_))));
        assert!(sink.aborted);
        assert!(!sink.finished);
        assert!(sink.frames.is_empty());
    }
}
