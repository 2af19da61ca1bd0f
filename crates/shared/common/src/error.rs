//! Unified error handling for store access.
//!
//! Every failure surfaced by the data layer is a store failure: either the
//! store could not be reached, or it rejected a statement. Missing rows are
//! not errors and never show up here.

use sea_orm::DbErr;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    /// No connection to the store could be established or acquired
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected a statement
    #[error("Database error: {0}")]
    Database(#[source] DbErr),
}

impl AppError {
    /// Get stable error code for callers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unavailable(_) => "STORE_UNAVAILABLE",
            AppError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Check if the store could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AppError::Unavailable(_))
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => AppError::Unavailable(err.to_string()),
            other => AppError::Database(other),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;
