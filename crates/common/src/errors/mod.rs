//! Error types for the citegraph services
//!
//! Provides the shared failure taxonomy:
//! - Retryable request failures (transport faults, unexpected statuses, 429s)
//! - Terminal per-request failure after the retry budget is spent
//! - Per-query and per-record failures that degrade rather than abort

use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Network-level fault before an HTTP status was received
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The API answered HTTP 429
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    /// The API answered a non-200, non-429 status
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    /// The retry budget for a single request is spent; carries the last failure
    #[error("all {attempts} attempts failed: {last}")]
    ExhaustedRetries { attempts: u32, last: Box<AppError> },

    /// A search produced no usable result for the query
    #[error("no result found for query: {query}")]
    NoResultFound { query: String },

    /// A raw record could not be normalized
    #[error("malformed record: {message}")]
    MalformedRecord { message: String },

    #[error("configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport {
            message: err.to_string(),
        }
    }
}

impl AppError {
    /// Whether the client retry loop may try this failure again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Transport { .. } | AppError::RateLimited | AppError::UnexpectedStatus { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(AppError::RateLimited.is_retryable());
        assert!(AppError::UnexpectedStatus { status: 500 }.is_retryable());
        assert!(!AppError::ExhaustedRetries {
            attempts: 3,
            last: Box::new(AppError::RateLimited),
        }
        .is_retryable());
    }

    #[test]
    fn test_exhausted_carries_last_failure() {
        let err = AppError::ExhaustedRetries {
            attempts: 3,
            last: Box::new(AppError::UnexpectedStatus { status: 500 }),
        };
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("500"));
    }
}
