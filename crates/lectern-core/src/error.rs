//! Error types module
//!
//! `ApiError` covers every failure of a single call against the materials API or
//! the storage endpoint. `UploadError` wraps it with the protocol step that failed,
//! so an upload pipeline can short-circuit with `?` and still record which step
//! broke.

use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response. `message` is the server's `error`/`message` field, or the
    /// HTTP status when the body carries neither.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Build a status error from a response body, preferring the server's own
    /// `error` or `message` field over the bare status code.
    pub fn from_response(status: u16, body: &str) -> Self {
        ApiError::Status {
            status,
            message: failure_message(status, body),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Extract a human-readable failure description from an error body.
///
/// `{"error": "...", "detail": "..."}` becomes `"... (...)"`; a body without an
/// `error`/`message` field falls back to `"HTTP <status>"`.
pub fn failure_message(status: u16, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    match field("error").or_else(|| field("message")) {
        Some(message) => match field("detail") {
            Some(detail) => format!("{} ({})", message, detail),
            None => message,
        },
        None => format!("HTTP {}", status),
    }
}

/// The three steps of the presigned upload protocol, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStep {
    Authorize,
    Transfer,
    Confirm,
}

impl UploadStep {
    /// Prefix shown in front of the failure message of an item that failed here.
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            UploadStep::Authorize => "Failed to get upload URL",
            UploadStep::Transfer => "Storage upload failed",
            UploadStep::Confirm => "Upload confirmation failed",
        }
    }
}

impl Display for UploadStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadStep::Authorize => write!(f, "authorize"),
            UploadStep::Transfer => write!(f, "transfer"),
            UploadStep::Confirm => write!(f, "confirm"),
        }
    }
}

/// Terminal failure of one item's upload pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {}", .step.failure_prefix(), .source)]
pub struct UploadError {
    pub step: UploadStep,
    #[source]
    pub source: ApiError,
}

impl UploadError {
    pub fn new(step: UploadStep, source: ApiError) -> Self {
        Self { step, source }
    }
}

/// Attach the failing protocol step to an `ApiError` result.
pub trait UploadStepExt<T> {
    fn at_step(self, step: UploadStep) -> Result<T, UploadError>;
}

impl<T> UploadStepExt<T> for Result<T, ApiError> {
    fn at_step(self, step: UploadStep) -> Result<T, UploadError> {
        self.map_err(|source| UploadError::new(step, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_prefers_error_field() {
        let body = r#"{"error": "Unsupported file type"}"#;
        assert_eq!(failure_message(400, body), "Unsupported file type");
    }

    #[test]
    fn failure_message_falls_back_to_message_field() {
        let body = r#"{"message": "Access denied"}"#;
        assert_eq!(failure_message(403, body), "Access denied");
    }

    #[test]
    fn failure_message_appends_detail() {
        let body = r#"{"error": "Failed to generate upload URL", "detail": "bucket missing"}"#;
        assert_eq!(
            failure_message(500, body),
            "Failed to generate upload URL (bucket missing)"
        );
    }

    #[test]
    fn failure_message_uses_status_without_json() {
        assert_eq!(failure_message(502, "<html>Bad gateway</html>"), "HTTP 502");
        assert_eq!(failure_message(500, ""), "HTTP 500");
        assert_eq!(failure_message(500, r#"{"error": "  "}"#), "HTTP 500");
    }

    #[test]
    fn upload_error_display_names_step() {
        let err = UploadError::new(
            UploadStep::Authorize,
            ApiError::from_response(403, r#"{"error": "Access denied to this course"}"#),
        );
        assert_eq!(
            err.to_string(),
            "Failed to get upload URL: Access denied to this course"
        );

        let err = UploadError::new(UploadStep::Transfer, ApiError::from_response(403, ""));
        assert_eq!(err.to_string(), "Storage upload failed: HTTP 403");
    }

    #[test]
    fn at_step_keeps_ok_values() {
        let ok: Result<u8, ApiError> = Ok(7);
        assert_eq!(ok.at_step(UploadStep::Confirm), Ok(7));

        let err: Result<u8, ApiError> = Err(ApiError::Transport("connection reset".into()));
        let err = err.at_step(UploadStep::Confirm).unwrap_err();
        assert_eq!(err.step, UploadStep::Confirm);
        assert_eq!(err.source.status_code(), None);
    }
}
