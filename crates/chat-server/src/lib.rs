//! Channel chat server.
//!
//! One listener serves the JSON HTTP routes (users, channels, messages) and
//! streams channel messages to authenticated WebSocket clients at
//! `/channels/{slug}/messages_ws`, over memory or Redis backends.
//!
//! # Architecture
//!
//! ```text
//! TcpListener -> hyper -> Router -+- HTTP handlers ----------> ChatService
//!                                 |      |                       |
//!                                 |   AuthGate           memory | Redis Streams
//!                                 |      |
//!                                 +- WebSocketConnection -> Handshake -> subscribe / publish
//! ```

pub mod config;
pub mod endpoint;
pub mod error;
pub mod routes;
pub mod server;
pub mod services;

pub use config::ServerConfig;
pub use endpoint::MessagesEndpoint;
pub use error::{ServerError, ServerResult};
pub use routes::{router, ApiError, AppState};
pub use server::ChatServer;
pub use services::Services;
