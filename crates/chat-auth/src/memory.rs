//! In-process user store.

use crate::digest::PasswordDigest;
use crate::error::{AuthError, AuthResult};
use crate::service::{verify, AuthService};
use async_trait::async_trait;
use chat_protocol_types::{User, UserBase};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::info;

/// Users held in memory for the lifetime of the process.
#[derive(Default)]
pub struct MemoryAuthService {
    users: RwLock<HashMap<String, PasswordDigest>>,
}

impl MemoryAuthService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthService for MemoryAuthService {
    async fn create_user(&self, user: User) -> AuthResult<UserBase> {
        let digest = PasswordDigest::create(user.password())?;
        {
            let mut users = self.users.write();
            if users.contains_key(user.username()) {
                return Err(AuthError::DuplicateUser(user.username().to_string()));
            }
            users.insert(user.username().to_string(), digest);
        }

        info!(username = %user.username(), "Created user");
        Ok(user.into_base())
    }

    async fn authenticate_user(&self, username: &str, password: &str) -> AuthResult<UserBase> {
        let stored = self.users.read().get(username).cloned();
        verify(username, stored.as_ref(), password)
    }
}
