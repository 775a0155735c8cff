//! Channel chat service.
//!
//! - [`ChatService`]: create and list channels, send messages, read history,
//!   subscribe.
//! - [`Subscription`]: yields every message of a channel in publish order,
//!   optionally starting with the stored backlog, plus an
//!   [`IdleTick`](chat_protocol_types::Notification::IdleTick) whenever the
//!   idle timeout passes without one.
//!
//! Two backends implement [`ChatBackend`]:
//!
//! | Backend | Channels | Messages | Subscription position |
//! |---|---|---|---|
//! | [`MemoryBackend`] | in-process list | per-channel `Vec` | index into the list |
//! | [`RedisBackend`] | hash `:channels` | stream `:channel-{slug}:messages` | last-seen stream id |
//!
//! Both reject duplicate channel slugs and treat an unknown slug as
//! [`ChatError::ChannelNotFound`].

mod backend;
mod config;
mod error;
mod memory;
mod redis;
mod service;

#[cfg(test)]
mod tests;

pub use backend::{ChatBackend, CursorStart, MessageCursor};
pub use config::BackendKind;
pub use error::{ChatError, ChatResult};
pub use memory::MemoryBackend;
pub use redis::{messages_key, RedisBackend, CHANNELS_KEY};
pub use service::{ChatService, Subscription};
