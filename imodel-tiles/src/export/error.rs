//! Error types for the export protocol.

use std::time::Duration;

use thiserror::Error;

use super::types::ExportStatus;
use crate::http::HttpError;

/// Errors raised while talking to the Mesh Export service.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The request never produced a response.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    /// The service answered 2xx with an error envelope.
    #[error("service error from {url}: {message}")]
    Api { url: String, message: String },

    /// The response body did not have the expected shape.
    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// A request URL could not be built.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The export reached a terminal failure status.
    #[error("export {export_id} ended with status {status}")]
    ExportFailed {
        export_id: String,
        status: ExportStatus,
    },

    /// The export did not complete before the poll deadline.
    #[error(
        "timed out after {}ms waiting for export {export_id} to complete",
        elapsed.as_millis()
    )]
    Timeout { export_id: String, elapsed: Duration },

    /// The operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_export_and_elapsed() {
        let err = ExportError::Timeout {
            export_id: "42".to_string(),
            elapsed: Duration::from_millis(300_000),
        };
        let message = err.to_string();
        assert!(message.contains("300000ms"));
        assert!(message.contains("42"));
    }

    #[test]
    fn test_export_failed_message_includes_status() {
        let err = ExportError::ExportFailed {
            export_id: "7".to_string(),
            status: ExportStatus::Invalid,
        };
        assert_eq!(err.to_string(), "export 7 ended with status Invalid");
    }
}
