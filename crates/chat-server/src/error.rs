//! Error types for the chat server.

use chat_auth::AuthError;
use chat_service::ChatError;
use stream_handshake::TransportError;
use stream_log::LogError;
use thiserror::Error;

/// Server error type.
#[derive(Error, Debug)]
pub enum ServerError {
    /// IO error (bind, accept)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Redis connection error
    #[error("Storage error: {0}")]
    Log(#[from] LogError),

    /// Chat service error
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    /// Auth error
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// WebSocket transport error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
