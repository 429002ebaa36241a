//! Storage error model shared by the catalog store and the history ledger.

use thiserror::Error;

/// Persistence operation error.
///
/// These are **infrastructure errors** as opposed to domain errors. The only
/// classified cases are the ones callers branch on (uniqueness, missing
/// record); everything else is an opaque backend failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store's uniqueness constraint on `name` rejected the write.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// The record targeted by an update no longer exists.
    #[error("record not found")]
    NotFound,

    /// Underlying I/O or driver failure, not otherwise classified.
    #[error("storage failure in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }

    pub(crate) fn poisoned(operation: &'static str) -> Self {
        Self::backend(operation, "lock poisoned")
    }
}

/// Map SQLx errors into `StoreError`.
///
/// | SQLx error | PostgreSQL code | StoreError |
/// |---|---|---|
/// | Database (unique violation) | `23505` | `DuplicateName` |
/// | RowNotFound | N/A | `NotFound` |
/// | anything else | any | `Backend` |
pub(crate) fn map_sqlx_error(operation: &'static str, name: Option<&str>, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                StoreError::DuplicateName(name.unwrap_or_default().to_string())
            } else {
                StoreError::backend(operation, format!("database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::PoolClosed => StoreError::backend(operation, "connection pool closed"),
        other => StoreError::backend(operation, other.to_string()),
    }
}
