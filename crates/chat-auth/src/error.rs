//! Error types for the auth gate.

use chat_protocol_types::ValidationError;
use stream_log::LogError;
use thiserror::Error;

/// Auth error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Wrong password or unknown user. The two are never distinguished.
    #[error("Invalid credentials.")]
    InvalidCredentials,

    /// No usable credential was presented
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A user with this username already exists
    #[error("User already exists: {0}")]
    DuplicateUser(String),

    /// Username or password failed validation
    #[error("Invalid user: {0}")]
    Validation(#[from] ValidationError),

    /// The password hasher rejected its input
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// A stored password digest could not be decoded
    #[error("Corrupt password digest for user {0}")]
    CorruptDigest(String),

    /// User store unavailable
    #[error("User store error: {0}")]
    Storage(#[from] LogError),
}

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;
