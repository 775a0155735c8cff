//! Handshake and transport error types.

use crate::connection::{INTERNAL_ERROR, POLICY_VIOLATION};
use chat_auth::AuthError;
use thiserror::Error;

/// Transport error type.
#[derive(Error, Debug)]
pub enum TransportError {
    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] axum::Error),

    /// The connection was used before `accept`, or accepted twice
    #[error("Connection not in the expected state: {0}")]
    State(&'static str),
}

/// Result type alias using TransportError.
pub type TransportResult<T> = Result<T, TransportError>;

/// Handshake error type.
#[derive(Error, Debug)]
pub enum HandshakeError {
    /// No credential message arrived in time
    #[error("Authentication timed out")]
    Timeout,

    /// The peer went away before authenticating
    #[error("Connection closed before authentication")]
    Disconnected,

    /// Credential missing, malformed or rejected
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Transport failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl HandshakeError {
    /// Close code sent to the peer.
    pub fn close_code(&self) -> u16 {
        match self {
            HandshakeError::Auth(AuthError::Storage(_))
            | HandshakeError::Auth(AuthError::CorruptDigest(_))
            | HandshakeError::Auth(AuthError::Hashing(_))
            | HandshakeError::Transport(_) => INTERNAL_ERROR,
            _ => POLICY_VIOLATION,
        }
    }

    /// Human-readable close reason sent to the peer.
    pub fn close_reason(&self) -> String {
        match self.close_code() {
            INTERNAL_ERROR => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias using HandshakeError.
pub type HandshakeResult<T> = Result<T, HandshakeError>;
