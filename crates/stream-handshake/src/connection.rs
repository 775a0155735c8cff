//! The duplex connection interface the handshake runs over.

use crate::error::TransportResult;
use async_trait::async_trait;
use std::time::Duration;

/// Close code: policy violation.
pub const POLICY_VIOLATION: u16 = 1008;

/// Close code: internal server error.
pub const INTERNAL_ERROR: u16 = 1011;

/// What the peer sent while establishing the connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionMetadata {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl ConnectionMetadata {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Outcome of waiting for an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Text(String),
    TimedOut,
    /// The peer closed the connection or it dropped.
    Closed,
}

/// A bidirectional message connection.
#[async_trait]
pub trait DuplexConnection: Send {
    /// Complete connection establishment and report its metadata.
    async fn accept(&mut self) -> TransportResult<ConnectionMetadata>;

    async fn send(&mut self, text: String) -> TransportResult<()>;

    /// Next text message, waiting up to `timeout` (`None` waits indefinitely).
    /// Control frames are handled internally and never returned.
    async fn receive(&mut self, timeout: Option<Duration>) -> TransportResult<Received>;

    /// Close with a code and reason. Closing twice is not an error.
    async fn close(&mut self, code: u16, reason: &str) -> TransportResult<()>;
}
