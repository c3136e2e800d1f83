use dms_db::{object_id::OpPermissionId, OpRangeType};
use thiserror::Error;

use crate::GrantPath;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every variant means the caller must deny the operation it was checking.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Db(#[from] diesel::result::Error),

    #[error("Database pool error: {0}")]
    DbPool(#[from] deadpool_diesel::PoolError),

    #[error("Database task failed: {0}")]
    Interact(String),

    #[error(
        "Data integrity error: permission {permission} is declared {range_type} but was granted with {scope} scope through {path}"
    )]
    DataIntegrity {
        permission: OpPermissionId,
        range_type: OpRangeType,
        scope: OpRangeType,
        path: GrantPath,
    },

    #[error("Permission query exceeded its deadline")]
    Timeout,
}

impl Error {
    pub fn error_kind(&self) -> &'static str {
        match self {
            Error::Db(_) => "db",
            Error::DbPool(_) => "db_pool",
            Error::Interact(_) => "db",
            Error::DataIntegrity { .. } => "data_integrity",
            Error::Timeout => "timeout",
        }
    }
}

impl From<deadpool_diesel::InteractError> for Error {
    fn from(e: deadpool_diesel::InteractError) -> Self {
        Error::Interact(format!("{e:?}"))
    }
}
