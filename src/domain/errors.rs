//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! Store faults are classified on the way in so callers never see a raw driver error.

use std::fmt;

use sea_orm::{DbErr, RuntimeErr, SqlErr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Row or edge absent, or hidden by a soft delete
    NotFound,
    /// Uniqueness violation
    Conflict(String),
    /// Malformed identifier or request shape
    InvalidArgument(String),
    /// Credential mismatch
    Unauthenticated,
    /// Transient store or connectivity fault, safe to retry
    Unavailable(String),
    /// Permanent database/persistence error
    Database(String),
    /// Generic internal error
    Internal(String),
}

impl DomainError {
    /// Whether the caller may retry the same operation unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Unavailable(_))
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => write!(f, "Resource not found"),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            DomainError::Unauthenticated => write!(f, "Invalid credentials"),
            DomainError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => return DomainError::Conflict(msg),
            // A dangling reference means the target user does not exist
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => return DomainError::NotFound,
            _ => {}
        }

        // SQLite constraint codes are not always surfaced through `sql_err`
        let message = e.to_string();
        if message.contains("UNIQUE constraint failed") {
            return DomainError::Conflict(message);
        }
        if message.contains("FOREIGN KEY constraint failed") {
            return DomainError::NotFound;
        }

        match &e {
            DbErr::RecordNotFound(_) => DomainError::NotFound,
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => DomainError::Unavailable(message),
            DbErr::Exec(RuntimeErr::SqlxError(inner)) | DbErr::Query(RuntimeErr::SqlxError(inner))
                if is_transient_sqlx(inner) =>
            {
                DomainError::Unavailable(message)
            }
            _ => DomainError::Database(message),
        }
    }
}

fn is_transient_sqlx(e: &sqlx::Error) -> bool {
    use sqlx::Error;

    matches!(
        e,
        Error::Io(_) | Error::PoolTimedOut | Error::PoolClosed | Error::WorkerCrashed
    )
}
