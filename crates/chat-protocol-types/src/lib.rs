//! Shared types for the channel-chat backends.
//!
//! This crate provides:
//! - `Channel`: a named, immutable chat channel keyed by slug
//! - `UserBase` / `User`: the public user view and the write-only credential form
//! - `MessageBody`, `MessageBase`, `Message`: published chat messages and their
//!   JSON wire format
//! - `Notification`: one step of a subscription (a message or an idle tick)

mod channel;
mod error;
mod message;
pub mod timestamp;
mod user;

pub use channel::Channel;
pub use error::{ValidationError, ValidationResult};
pub use message::{Message, MessageBase, MessageBody, Notification};
pub use user::{User, UserBase};
