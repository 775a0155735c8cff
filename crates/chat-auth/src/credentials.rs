//! `Authorization: Basic ...` credentials.

use crate::error::{AuthError, AuthResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fmt;

const BASIC_SCHEME: &str = "Basic";

/// Username and password extracted from an `Authorization` value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse `Basic base64(username:password)`.
    ///
    /// Anything else (other scheme, bad base64, no colon) is
    /// [`AuthError::NotAuthenticated`].
    pub fn from_basic_header(value: &str) -> AuthResult<Self> {
        let (scheme, encoded) = value
            .trim()
            .split_once(' ')
            .ok_or(AuthError::NotAuthenticated)?;
        if !scheme.eq_ignore_ascii_case(BASIC_SCHEME) {
            return Err(AuthError::NotAuthenticated);
        }

        let decoded = BASE64
            .decode(encoded.trim())
            .map_err(|_| AuthError::NotAuthenticated)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::NotAuthenticated)?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(AuthError::NotAuthenticated)?;

        Ok(Self::new(username, password))
    }

    /// Render as an `Authorization` header value.
    pub fn to_basic_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("{} {}", BASIC_SCHEME, BASE64.encode(raw))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        // base64("test:test")
        let credentials = Credentials::from_basic_header("Basic dGVzdDp0ZXN0").unwrap();
        assert_eq!(credentials, Credentials::new("test", "test"));
    }

    #[test]
    fn test_password_may_contain_colon() {
        let header = Credentials::new("a", "b:c").to_basic_header();
        let credentials = Credentials::from_basic_header(&header).unwrap();
        assert_eq!(credentials.username, "a");
        assert_eq!(credentials.password, "b:c");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert!(Credentials::from_basic_header("basic dGVzdDp0ZXN0").is_ok());
    }

    #[test]
    fn test_malformed_is_not_authenticated() {
        for value in [
            "",
            "Basic",
            "Bearer dGVzdDp0ZXN0",
            "Basic !!!",
            // base64("nocolon")
            "Basic bm9jb2xvbg==",
        ] {
            assert!(
                matches!(
                    Credentials::from_basic_header(value),
                    Err(AuthError::NotAuthenticated)
                ),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("u", "hunter2"));
        assert!(!debug.contains("hunter2"));
    }
}
