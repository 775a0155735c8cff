//! Error types for the stream log.

use thiserror::Error;

/// Stream log error type.
#[derive(Error, Debug)]
pub enum LogError {
    /// Redis connection or operation error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Protocol error (unexpected reply shape, malformed ids)
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type for stream log operations.
pub type LogResult<T> = Result<T, LogError>;
