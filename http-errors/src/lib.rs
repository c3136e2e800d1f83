use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::borrow::Cow;
use tracing::{event, Level};

/// The JSON body of every error response: `{"error": {"kind": ..., "message": ...}}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponseData {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    kind: Cow<'static, str>,
    message: Cow<'static, str>,
}

impl ErrorResponseData {
    pub fn new(
        kind: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> ErrorResponseData {
        ErrorResponseData {
            error: ErrorDetails {
                kind: kind.into(),
                message: message.into(),
            },
        }
    }

    /// A body that hides the cause of the error, for production responses.
    pub fn obfuscated(status: StatusCode) -> Option<ErrorResponseData> {
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE => "Internal error",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            _ => return None,
        };

        let kind = status
            .canonical_reason()
            .unwrap_or("error")
            .to_lowercase()
            .replace(' ', "_");
        Some(ErrorResponseData::new(kind, message))
    }

    pub fn kind(&self) -> &str {
        &self.error.kind
    }

    pub fn message(&self) -> &str {
        &self.error.message
    }

    /// Log the error and build the response. Server errors log at ERROR, everything else at
    /// WARN.
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        if status.is_server_error() {
            event!(Level::ERROR, %status, kind=%self.error.kind, message=%self.error.message);
        } else {
            event!(Level::WARN, %status, kind=%self.error.kind, message=%self.error.message);
        }

        (status, Json(self)).into_response()
    }
}
