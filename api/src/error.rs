use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dms_db::object_id::OpPermissionId;
use thiserror::Error;

use dms_http_errors::ErrorResponseData;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database Error: {0}")]
    DbErr(#[from] diesel::result::Error),

    #[error("Database Pool Error: {0}")]
    DbPool(#[from] deadpool_diesel::PoolError),

    #[error("Database Error: {0}")]
    DeadpoolInteract(String),

    #[error("Server error: {0}")]
    ServerError(#[from] hyper::Error),

    #[error(transparent)]
    Permissions(#[from] dms_permissions::Error),

    #[error("Missing Permission {0}")]
    MissingPermission(OpPermissionId),

    #[error("Only the user or an administrator may read these permissions")]
    NotSelfOrAdmin,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Invalid user id header")]
    InvalidUserHeader,

    #[error("Invalid deadline header")]
    InvalidDeadlineHeader,

    #[error(transparent)]
    Generic(#[from] anyhow::Error),
}

impl Error {
    fn error_kind(&self) -> &'static str {
        match self {
            Error::DbErr(_) => "db",
            Error::DbPool(_) => "db_pool",
            Error::DeadpoolInteract(_) => "db",
            Error::ServerError(_) => "internal_server_error",
            Error::Permissions(e) => e.error_kind(),
            Error::MissingPermission(_) => "missing_permission",
            Error::NotSelfOrAdmin => "missing_permission",
            Error::Unauthenticated => "authn",
            Error::InvalidUserHeader => "authn",
            Error::InvalidDeadlineHeader => "bad_request",
            Error::Generic(_) => "internal_server_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingPermission(_) => StatusCode::FORBIDDEN,
            Error::NotSelfOrAdmin => StatusCode::FORBIDDEN,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::InvalidUserHeader => StatusCode::UNAUTHORIZED,
            Error::InvalidDeadlineHeader => StatusCode::BAD_REQUEST,
            Error::DbPool(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Permissions(dms_permissions::Error::Timeout) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Permissions(dms_permissions::Error::DbPool(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn response_tuple(&self) -> (StatusCode, ErrorResponseData) {
        (
            self.status_code(),
            ErrorResponseData::new(self.error_kind(), self.to_string()),
        )
    }
}

impl From<deadpool_diesel::InteractError> for Error {
    fn from(e: deadpool_diesel::InteractError) -> Self {
        Error::DeadpoolInteract(format!("{e:?}"))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (code, json) = self.response_tuple();
        json.into_response_with_status(code)
    }
}
