use std::fmt;
use thiserror::Error;

/// The error type shared by both services.
///
/// Crate-specific errors (for example the database error) convert into this
/// type with a `From` impl in the crate that defines them.
#[derive(Error, Debug)]
pub enum DevStatsError {
    /// Missing, blank, oversize or out-of-enumeration input
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A write lost a race against the `(userKey, deviceType)` unique constraint
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// The outbound HTTP call failed before a response arrived
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The outbound HTTP call timed out
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// The called service answered with something we cannot use
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for DevStatsError {
    fn status_code(&self) -> u16 {
        match self {
            DevStatsError::ValidationError(_) => 400,
            DevStatsError::ConflictError(_) => 400,
            DevStatsError::HttpError(_) => 500,
            DevStatsError::TimeoutError(_) => 500,
            DevStatsError::ExternalServiceError { .. } => 500,
            DevStatsError::DatabaseError(_) => 500,
            DevStatsError::ConfigError(_) => 500,
            DevStatsError::InternalError(_) => 500,
        }
    }
}

impl From<reqwest::Error> for DevStatsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DevStatsError::TimeoutError(err.to_string())
        } else {
            DevStatsError::HttpError(err.to_string())
        }
    }
}

pub fn validation_error<T: fmt::Display>(message: T) -> DevStatsError {
    DevStatsError::ValidationError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> DevStatsError {
    DevStatsError::ConflictError(message.to_string())
}

pub fn config_error<T: fmt::Display>(message: T) -> DevStatsError {
    DevStatsError::ConfigError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> DevStatsError {
    DevStatsError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> DevStatsError {
    DevStatsError::InternalError(message.to_string())
}
