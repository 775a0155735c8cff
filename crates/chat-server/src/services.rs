//! Backend construction.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use chat_auth::{AuthGate, AuthService, MemoryAuthService, RedisAuthService};
use chat_service::{BackendKind, ChatService, RedisBackend};
use std::sync::Arc;
use stream_log::RedisLog;
use tracing::info;

/// The chat service and auth gate a server runs with.
#[derive(Clone)]
pub struct Services {
    pub chat: ChatService,
    pub auth: AuthGate,
}

impl Services {
    /// Process-local services.
    pub fn in_memory() -> Self {
        Self {
            chat: ChatService::in_memory(),
            auth: AuthGate::new(Arc::new(MemoryAuthService::new())),
        }
    }

    /// Build the configured backends, sharing one Redis connection between
    /// them when both use Redis.
    pub async fn connect(config: &ServerConfig) -> ServerResult<Self> {
        let redis = if config.uses_redis() {
            info!(redis_url = %config.redis_url, "Connecting to Redis");
            Some(RedisLog::connect(&config.redis_url).await?)
        } else {
            None
        };

        let chat = match (config.chat_backend, &redis) {
            (BackendKind::Redis, Some(redis)) => {
                ChatService::new(Arc::new(RedisBackend::from_redis(redis.clone())))
            }
            _ => ChatService::in_memory(),
        };

        let auth: Arc<dyn AuthService> = match (config.auth_backend, redis) {
            (BackendKind::Redis, Some(redis)) => Arc::new(RedisAuthService::new(Arc::new(redis))),
            _ => Arc::new(MemoryAuthService::new()),
        };

        info!(
            chat_backend = %config.chat_backend,
            auth_backend = %config.auth_backend,
            "Services ready"
        );
        Ok(Self {
            chat,
            auth: AuthGate::new(auth),
        })
    }
}
