//! Users.

use crate::error::{non_empty, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "UserBaseFields")]
pub struct UserBase {
    username: String,
}

#[derive(Deserialize)]
struct UserBaseFields {
    username: String,
}

impl TryFrom<UserBaseFields> for UserBase {
    type Error = ValidationError;

    fn try_from(fields: UserBaseFields) -> ValidationResult<Self> {
        UserBase::new(fields.username)
    }
}

impl UserBase {
    /// Create a user view, rejecting an empty username.
    pub fn new(username: impl Into<String>) -> ValidationResult<Self> {
        let username = username.into();
        non_empty("username", &username)?;
        Ok(Self { username })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// A user together with its password, as submitted for account creation.
///
/// Deserialize-only: the password is write-only and never serialized back.
#[derive(Clone, Deserialize)]
#[serde(try_from = "UserFields")]
pub struct User {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct UserFields {
    username: String,
    password: String,
}

impl TryFrom<UserFields> for User {
    type Error = ValidationError;

    fn try_from(fields: UserFields) -> ValidationResult<Self> {
        User::new(fields.username, fields.password)
    }
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> ValidationResult<Self> {
        let username = username.into();
        let password = password.into();
        non_empty("username", &username)?;
        non_empty("password", &password)?;
        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Drop the credential, keeping the public view.
    pub fn into_base(self) -> UserBase {
        UserBase {
            username: self.username,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
