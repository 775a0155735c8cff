//! Server configuration.

use chat_service::BackendKind;
use std::time::Duration;

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default Redis URL.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Chat server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Storage for channels and messages
    pub chat_backend: BackendKind,

    /// Storage for users
    pub auth_backend: BackendKind,

    /// Redis connection URL, used by whichever backends are `redis`
    pub redis_url: String,

    /// Quiet period after which a subscription yields an idle tick
    pub idle_timeout: Duration,

    /// How long a connection may take to present credentials
    pub handshake_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            chat_backend: BackendKind::Memory,
            auth_backend: BackendKind::Memory,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            idle_timeout: Duration::from_millis(1000),
            handshake_timeout: stream_handshake::DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether any backend needs a Redis connection.
    pub fn uses_redis(&self) -> bool {
        self.chat_backend == BackendKind::Redis || self.auth_backend == BackendKind::Redis
    }
}
