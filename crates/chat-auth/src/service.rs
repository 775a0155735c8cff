//! The `AuthService` capability.

use crate::digest::PasswordDigest;
use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use chat_protocol_types::{User, UserBase};

/// User store with password verification.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a user. Fails with [`AuthError::DuplicateUser`] if the
    /// username is taken.
    async fn create_user(&self, user: User) -> AuthResult<UserBase>;

    /// Verify a username/password pair.
    async fn authenticate_user(&self, username: &str, password: &str) -> AuthResult<UserBase>;
}

/// Shared verification step. An unknown user is checked against the dummy
/// digest so both failure paths do the same work.
pub(crate) fn verify(
    username: &str,
    stored: Option<&PasswordDigest>,
    password: &str,
) -> AuthResult<UserBase> {
    let matched = match stored {
        Some(digest) => digest.verify(password),
        None => {
            if let Some(dummy) = PasswordDigest::dummy() {
                dummy.verify(password);
            }
            false
        }
    };

    if !matched {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(UserBase::new(username)?)
}
