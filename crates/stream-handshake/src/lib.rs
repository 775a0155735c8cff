//! Authentication handshake for WebSocket connections.
//!
//! - [`DuplexConnection`]: accept / send / receive-with-timeout / close, the
//!   only transport surface the handshake and the chat endpoint use.
//! - [`WebSocketConnection`]: the implementation over an upgraded axum
//!   WebSocket; [`metadata_from`] captures the upgrade request.
//! - [`Handshake`]: authenticates an accepted connection from its
//!   `Authorization` header or, failing that, from the first message, and
//!   closes it with a policy-violation code on any failure.

mod connection;
mod error;
mod handshake;
mod websocket;

pub use connection::{ConnectionMetadata, DuplexConnection, Received, INTERNAL_ERROR, POLICY_VIOLATION};
pub use error::{HandshakeError, HandshakeResult, TransportError, TransportResult};
pub use handshake::{extract_credential, reject, Handshake, AUTHORIZATION, DEFAULT_HANDSHAKE_TIMEOUT};
pub use websocket::{metadata_from, WebSocketConnection};
