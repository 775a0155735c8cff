//! First-message authentication.
//!
//! Browsers cannot set an `Authorization` header on a WebSocket upgrade, so
//! a client may instead send it as the first message once the connection is
//! open:
//!
//! ```text
//! client                                  server
//!   | ---- upgrade (no Authorization) ----> |  accept
//!   | ---- {"Authorization": "Basic ..."} -> |  wait <= handshake timeout
//!   |                                        |  AuthGate
//!   | <---------- messages ---------------- |  ok
//!   | <---------- close 1008 "reason" ----- |  any failure
//! ```

use crate::connection::{ConnectionMetadata, DuplexConnection, Received};
use crate::error::{HandshakeError, HandshakeResult};
use chat_auth::{AuthError, AuthGate};
use chat_protocol_types::UserBase;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Header and first-message field carrying the credential.
pub const AUTHORIZATION: &str = "Authorization";

/// Default wait for the credential message.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Pull the credential out of a first message of the form
/// `{"Authorization": "Basic ..."}`.
pub fn extract_credential(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    value
        .as_object()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(AUTHORIZATION))
        .and_then(|(_, value)| value.as_str())
        .map(str::to_string)
}

/// Authenticates freshly accepted connections.
#[derive(Clone)]
pub struct Handshake {
    gate: AuthGate,
    timeout: Duration,
}

impl Handshake {
    pub fn new(gate: AuthGate, timeout: Duration) -> Self {
        Self { gate, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Authenticate an accepted connection.
    ///
    /// Uses the `Authorization` header if the upgrade carried one, otherwise
    /// waits for the first message. On failure the connection is closed
    /// before returning.
    pub async fn run<C>(
        &self,
        connection: &mut C,
        metadata: &ConnectionMetadata,
    ) -> HandshakeResult<UserBase>
    where
        C: DuplexConnection + ?Sized,
    {
        match self.authenticate(connection, metadata).await {
            Ok(user) => {
                info!(path = %metadata.path, username = %user.username(), "Connection authenticated");
                Ok(user)
            }
            Err(e) => {
                warn!(path = %metadata.path, error = %e, "Handshake failed");
                reject(connection, e.close_code(), &e.close_reason()).await;
                Err(e)
            }
        }
    }

    async fn authenticate<C>(
        &self,
        connection: &mut C,
        metadata: &ConnectionMetadata,
    ) -> HandshakeResult<UserBase>
    where
        C: DuplexConnection + ?Sized,
    {
        let credential = match metadata.header(AUTHORIZATION) {
            Some(value) => value.to_string(),
            None => self.await_credential(connection).await?,
        };
        Ok(self.gate.authenticate_header(Some(&credential)).await?)
    }

    async fn await_credential<C>(&self, connection: &mut C) -> HandshakeResult<String>
    where
        C: DuplexConnection + ?Sized,
    {
        debug!(timeout_ms = self.timeout.as_millis() as u64, "Waiting for credential message");
        match connection.receive(Some(self.timeout)).await? {
            Received::Text(text) => {
                extract_credential(&text).ok_or(HandshakeError::Auth(AuthError::NotAuthenticated))
            }
            Received::TimedOut => Err(HandshakeError::Timeout),
            Received::Closed => Err(HandshakeError::Disconnected),
        }
    }
}

/// Close a connection we are refusing. Transport errors are logged only;
/// the connection is being dropped either way.
pub async fn reject<C>(connection: &mut C, code: u16, reason: &str)
where
    C: DuplexConnection + ?Sized,
{
    if let Err(e) = connection.close(code, reason).await {
        debug!(error = %e, "Close after rejection failed");
    }
}
