//! The auth gate: turns a presented credential into a user identity.

use crate::credentials::Credentials;
use crate::error::{AuthError, AuthResult};
use crate::service::AuthService;
use chat_protocol_types::{User, UserBase};
use std::sync::Arc;
use tracing::debug;

/// Front door for every authenticated request or connection.
#[derive(Clone)]
pub struct AuthGate {
    service: Arc<dyn AuthService>,
}

impl AuthGate {
    pub fn new(service: Arc<dyn AuthService>) -> Self {
        Self { service }
    }

    pub async fn create_user(&self, user: User) -> AuthResult<UserBase> {
        self.service.create_user(user).await
    }

    pub async fn authenticate(&self, credentials: &Credentials) -> AuthResult<UserBase> {
        let result = self
            .service
            .authenticate_user(&credentials.username, &credentials.password)
            .await;
        if let Err(e) = &result {
            debug!(username = %credentials.username, error = %e, "Authentication failed");
        }
        result
    }

    /// Authenticate an `Authorization` value. A missing value is
    /// [`AuthError::NotAuthenticated`].
    pub async fn authenticate_header(&self, authorization: Option<&str>) -> AuthResult<UserBase> {
        let value = authorization.ok_or(AuthError::NotAuthenticated)?;
        let credentials = Credentials::from_basic_header(value)?;
        self.authenticate(&credentials).await
    }
}
