//! Error types for the database client

use devstats_common::{conflict, DevStatsError};
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(sqlx::Error),

    /// A unique constraint rejected the write
    #[error("Database unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Error with database transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),

    /// A stored row could not be turned back into a registration
    #[error("Database row mapping error: {0}")]
    MappingError(String),
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DbError::UniqueViolation(db_err.message().to_string());
            }
        }
        DbError::SqlxError(err)
    }
}

impl From<DbError> for DevStatsError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(message) => conflict(message),
            other => DevStatsError::DatabaseError(other.to_string()),
        }
    }
}
