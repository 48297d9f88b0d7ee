//! Error types for plic-gw
//!
//! [`AnalysisError`] is the gateway's error taxonomy. [`ApiError`] adds the
//! HTTP-only failures (malformed body, oversize body, wrong method) and maps
//! everything onto `{ "error": message }` responses.
//!
//! User-facing messages are fixed per class; detailed causes go to the log.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Analysis failure classes
///
/// None of these are retried. Each terminates the request with no partial
/// result.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Bad caller input; shown to the user verbatim
    #[error("Validation error: {0}")]
    Validation(String),

    /// Provider credential missing or malformed; operator problem
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider unreachable or answered with a non-success status
    #[error("Upstream error (status {status:?}): {message}")]
    Upstream { status: Option<u16>, message: String },

    /// Provider reply did not satisfy the result contract
    #[error("Parse error: {0}")]
    Parse(String),
}

impl AnalysisError {
    /// Stable identifier used in error bodies and logs
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::Validation(_) => "VALIDATION_ERROR",
            AnalysisError::Configuration(_) => "CONFIGURATION_ERROR",
            AnalysisError::Upstream { .. } => "UPSTREAM_ERROR",
            AnalysisError::Parse(_) => "PARSE_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::Validation(_) => StatusCode::BAD_REQUEST,
            AnalysisError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AnalysisError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AnalysisError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the end user
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Validation(msg) => msg.clone(),
            AnalysisError::Configuration(_) => {
                "The analysis service is not configured. Please contact the administrator.".to_string()
            }
            AnalysisError::Upstream { .. } => {
                "Image analysis failed. Please try again later.".to_string()
            }
            AnalysisError::Parse(_) => {
                "Could not read the analysis result. Please try again.".to_string()
            }
        }
    }
}

impl From<plic_common::Error> for AnalysisError {
    fn from(err: plic_common::Error) -> Self {
        match err {
            plic_common::Error::InvalidInput(msg) => AnalysisError::Validation(msg),
            plic_common::Error::Config(msg) => AnalysisError::Configuration(msg),
            plic_common::Error::Io(e) => AnalysisError::Configuration(e.to_string()),
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Body was not a JSON object of the expected shape (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Body exceeded the configured limit (413)
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Endpoint only accepts POST (405)
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Analysis(ref err) => (err.status_code(), err.code(), err.user_message()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "Request body too large".to_string(),
            ),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                "Only POST requests are supported".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        assert!(AnalysisError::Validation("x".into()).status_code().is_client_error());
        assert!(AnalysisError::Configuration("x".into()).status_code().is_server_error());
        assert!(AnalysisError::Upstream { status: Some(503), message: "x".into() }
            .status_code()
            .is_server_error());
        assert!(AnalysisError::Parse("x".into()).status_code().is_server_error());
    }

    #[test]
    fn test_user_message_hides_details() {
        let err = AnalysisError::Parse("raw reply: {\"secret\": 1}".to_string());
        assert!(!err.user_message().contains("secret"));

        let err = AnalysisError::Configuration("PLIC_API_KEY unset".to_string());
        assert!(!err.user_message().contains("PLIC_API_KEY"));
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = AnalysisError::Validation("Invalid image URL".to_string());
        assert_eq!(err.user_message(), "Invalid image URL");
    }

    #[test]
    fn test_common_error_conversion() {
        let err: AnalysisError = plic_common::Error::InvalidInput("bad".to_string()).into();
        assert!(matches!(err, AnalysisError::Validation(ref m) if m == "bad"));
    }
}
