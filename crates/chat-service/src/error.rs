//! Error types for the chat service.

use chat_protocol_types::ValidationError;
use stream_log::LogError;
use thiserror::Error;

/// Chat service error type.
#[derive(Error, Debug)]
pub enum ChatError {
    /// No channel with this slug
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// A channel with this slug already exists
    #[error("Channel already exists: {0}")]
    DuplicateChannel(String),

    /// Slug or name failed validation
    #[error("Invalid channel: {0}")]
    InvalidChannel(#[from] ValidationError),

    /// A subscriber's read position ran past the end of its channel log.
    /// Indicates a bug; never retried.
    #[error("Stale waiter on channel {channel}: position {position} beyond log length {len}")]
    StaleWaiter {
        channel: String,
        position: usize,
        len: usize,
    },

    /// A stored message could not be deserialized
    #[error("Failed to decode stored message {entry_id}: {source}")]
    Decode {
        entry_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A message could not be serialized for storage
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// Backend storage failure
    #[error("Storage error: {0}")]
    Log(#[from] LogError),

    /// Unrecognized backend name
    #[error("Unknown backend: {0} (expected \"memory\" or \"redis\")")]
    UnknownBackend(String),
}

impl ChatError {
    /// Whether a subscription must stop after this error.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatError::StaleWaiter { .. } | ChatError::Decode { .. })
    }
}

/// Result type for chat service operations.
pub type ChatResult<T> = Result<T, ChatError>;
