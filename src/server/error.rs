//! API error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::acquisition::{AcquisitionError, FailureKind};

/// A JSON error response. Carries the failure class and a bounded
/// diagnostic snippet when one exists; never credentials, never full
/// upstream payloads.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub kind: Option<&'static str>,
    pub snippet: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            kind: None,
            snippet: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            kind: None,
            snippet: None,
        }
    }
}

impl From<AcquisitionError> for ApiError {
    fn from(err: AcquisitionError) -> Self {
        let status = match err.kind {
            FailureKind::InvalidInput => StatusCode::BAD_REQUEST,
            FailureKind::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            FailureKind::NotFound => StatusCode::NOT_FOUND,
            FailureKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            FailureKind::NetworkTimeout => StatusCode::GATEWAY_TIMEOUT,
            FailureKind::BotDetectedOrBlocked | FailureKind::Unknown => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.message,
            kind: Some(err.kind.as_str()),
            snippet: err.snippet,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        error!("Database error: {}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal storage error".to_string(),
            kind: None,
            snippet: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "kind": self.kind,
            "snippet": self.snippet,
        }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_error_status_mapping() {
        let cases = [
            (FailureKind::InvalidInput, StatusCode::BAD_REQUEST),
            (FailureKind::AuthenticationRequired, StatusCode::UNAUTHORIZED),
            (FailureKind::NotFound, StatusCode::NOT_FOUND),
            (FailureKind::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (FailureKind::NetworkTimeout, StatusCode::GATEWAY_TIMEOUT),
            (FailureKind::BotDetectedOrBlocked, StatusCode::BAD_GATEWAY),
            (FailureKind::Unknown, StatusCode::BAD_GATEWAY),
        ];
        for (kind, status) in cases {
            let api: ApiError = AcquisitionError::new(kind, "message").into();
            assert_eq!(api.status, status, "{kind:?}");
            assert_eq!(api.kind, Some(kind.as_str()));
        }
    }
}
