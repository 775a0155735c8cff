//! Auth gate for channel chat.
//!
//! - [`AuthService`]: create and verify users; [`MemoryAuthService`] and
//!   [`RedisAuthService`] implement it.
//! - [`AuthGate`]: resolves a presented credential (an `Authorization: Basic`
//!   value) to a [`UserBase`](chat_protocol_types::UserBase).
//!
//! Passwords are kept only as Argon2id PHC strings. Unknown users and wrong
//! passwords fail identically with [`AuthError::InvalidCredentials`].

mod credentials;
mod digest;
mod error;
mod gate;
mod memory;
mod redis;
mod service;

pub use credentials::Credentials;
pub use digest::PasswordDigest;
pub use error::{AuthError, AuthResult};
pub use gate::AuthGate;
pub use memory::MemoryAuthService;
pub use redis::{RedisAuthService, USERS_KEY};
pub use service::AuthService;
