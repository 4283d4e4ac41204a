use std::time::Duration;
use thiserror::Error;

/// Closed error taxonomy for the capture pipeline.
///
/// Every handled failure maps onto one of these kinds so the failure-isolation
/// boundaries can be asserted in tests instead of matching log strings.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Browser launch failed: {0}")]
    LaunchFailure(String),

    #[error("Navigation timed out after {0:?}")]
    NavigationTimeout(Duration),

    #[error("Screenshot capture failed: {0}")]
    CaptureFailure(String),

    #[error("Video encoding failed: {0}")]
    EncodingFailure(String),

    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        CaptureError::ConfigurationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_carries_duration() {
        let err = CaptureError::NavigationTimeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Navigation timed out after 30s");
    }

    #[test]
    fn io_error_conversion() {
        let err: CaptureError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, CaptureError::IoError(_)));
    }
}
