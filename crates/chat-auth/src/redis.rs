//! User store in a Redis hash.
//!
//! Hash `:users`, field = username, value = the [`PasswordDigest`] PHC string.

use crate::digest::PasswordDigest;
use crate::error::{AuthError, AuthResult};
use crate::service::{verify, AuthService};
use async_trait::async_trait;
use chat_protocol_types::{User, UserBase};
use std::sync::Arc;
use stream_log::HashStore;
use tracing::{info, warn};

/// Hash holding every user's password digest.
pub const USERS_KEY: &str = ":users";

/// Users persisted in a [`HashStore`].
pub struct RedisAuthService {
    store: Arc<dyn HashStore>,
}

impl RedisAuthService {
    pub fn new(store: Arc<dyn HashStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for RedisAuthService {
    async fn create_user(&self, user: User) -> AuthResult<UserBase> {
        let digest = PasswordDigest::create(user.password())?;
        let created = self
            .store
            .set_if_absent(USERS_KEY, user.username(), digest.encode())
            .await?;
        if !created {
            return Err(AuthError::DuplicateUser(user.username().to_string()));
        }

        info!(username = %user.username(), "Created user");
        Ok(user.into_base())
    }

    async fn authenticate_user(&self, username: &str, password: &str) -> AuthResult<UserBase> {
        let stored = match self.store.get(USERS_KEY, username).await? {
            Some(encoded) => Some(PasswordDigest::decode(username, &encoded).inspect_err(
                |_| warn!(username = %username, "Stored password digest is corrupt"),
            )?),
            None => None,
        };
        verify(username, stored.as_ref(), password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stream_log::MockRedis;

    fn service() -> (MockRedis, RedisAuthService) {
        let redis = MockRedis::new();
        let auth = RedisAuthService::new(Arc::new(redis.clone()));
        (redis, auth)
    }

    #[tokio::test]
    async fn test_create_stores_digest_not_password() {
        let (redis, auth) = service();
        auth.create_user(User::new("test", "test").unwrap())
            .await
            .unwrap();

        let stored = redis.get(USERS_KEY, "test").await.unwrap().unwrap();
        assert!(stored.starts_with("$argon2id$"), "{stored}");
        assert!(PasswordDigest::decode("test", &stored).unwrap().verify("test"));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (_redis, auth) = service();
        auth.create_user(User::new("test", "test").unwrap())
            .await
            .unwrap();

        assert_eq!(
            auth.authenticate_user("test", "test").await.unwrap().username(),
            "test"
        );
        assert!(matches!(
            auth.authenticate_user("test", "bad").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate_user("nobody", "test").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_user_rejected() {
        let (_redis, auth) = service();
        auth.create_user(User::new("test", "a").unwrap())
            .await
            .unwrap();
        assert!(matches!(
            auth.create_user(User::new("test", "b").unwrap()).await,
            Err(AuthError::DuplicateUser(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_digest_is_an_error() {
        let (redis, auth) = service();
        redis
            .set_if_absent(USERS_KEY, "test", "plaintext")
            .await
            .unwrap();
        assert!(matches!(
            auth.authenticate_user("test", "plaintext").await,
            Err(AuthError::CorruptDigest(_))
        ));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (redis, auth) = service();
        redis.set_unavailable(true);
        assert!(matches!(
            auth.authenticate_user("test", "test").await,
            Err(AuthError::Storage(_))
        ));
    }
}
