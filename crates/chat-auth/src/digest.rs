//! Password digests.
//!
//! Passwords are hashed with Argon2id under a random salt and stored as the
//! PHC string the hasher produces (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`).
//! Verification reads the parameters back from that string.

use crate::error::{AuthError, AuthResult};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use std::fmt;
use std::sync::OnceLock;

/// An Argon2id password hash in PHC string form.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    phc: String,
}

impl PasswordDigest {
    /// Hash `password` under a fresh random salt.
    pub fn create(password: &str) -> AuthResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Self {
            phc: hash.to_string(),
        })
    }

    /// Digest checked for unknown users, so a lookup miss costs the same as a
    /// wrong password.
    pub(crate) fn dummy() -> Option<&'static Self> {
        static DUMMY: OnceLock<Option<PasswordDigest>> = OnceLock::new();
        DUMMY.get_or_init(|| Self::create("").ok()).as_ref()
    }

    /// The stored form.
    pub fn encode(&self) -> &str {
        &self.phc
    }

    /// Parse the stored form. `username` is only used in the error.
    pub fn decode(username: &str, stored: &str) -> AuthResult<Self> {
        PasswordHash::new(stored).map_err(|_| AuthError::CorruptDigest(username.to_string()))?;
        Ok(Self {
            phc: stored.to_string(),
        })
    }

    pub fn verify(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.phc) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let digest = PasswordDigest::create("test").unwrap();
        assert!(digest.verify("test"));
        assert!(!digest.verify("tes"));
        assert!(!digest.verify("test "));
        assert!(!digest.verify(""));
    }

    #[test]
    fn test_stored_form_is_argon2id_phc() {
        let digest = PasswordDigest::create("secret").unwrap();
        assert!(digest.encode().starts_with("$argon2id$"));
        assert!(!digest.encode().contains("secret"));
    }

    #[test]
    fn test_salts_differ() {
        let a = PasswordDigest::create("test").unwrap();
        let b = PasswordDigest::create("test").unwrap();
        assert_ne!(a.encode(), b.encode());
        assert!(a.verify("test") && b.verify("test"));
    }

    #[test]
    fn test_decode_keeps_stored_hash() {
        let digest = PasswordDigest::create("secret").unwrap();
        let decoded = PasswordDigest::decode("u", digest.encode()).unwrap();
        assert_eq!(decoded, digest);
        assert!(decoded.verify("secret"));
        assert!(!decoded.verify("Secret"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        for stored in ["", "plaintext", "$", "AAAA$AAAA", "$argon2id$"] {
            assert!(
                matches!(
                    PasswordDigest::decode("u", stored),
                    Err(AuthError::CorruptDigest(_))
                ),
                "accepted {stored:?}"
            );
        }
    }

    #[test]
    fn test_debug_hides_hash() {
        let digest = PasswordDigest::create("secret").unwrap();
        assert_eq!(format!("{:?}", digest), "PasswordDigest(..)");
    }

    #[test]
    fn test_dummy_is_stable() {
        let first = PasswordDigest::dummy().unwrap();
        assert!(std::ptr::eq(first, PasswordDigest::dummy().unwrap()));
        assert!(!first.verify("anything"));
    }
}
