//! Storage interface shared by the memory and Redis backends.

use crate::error::ChatResult;
use async_trait::async_trait;
use chat_protocol_types::{Channel, Message};
use std::time::Duration;

/// Where a new cursor starts reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStart {
    /// Before the first message: replays the whole history.
    Beginning,
    /// After the newest message at the time the cursor is opened.
    Now,
}

/// Channel registry plus per-channel message store.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Register a channel. Fails with `DuplicateChannel` if the slug is taken.
    async fn insert_channel(&self, channel: &Channel) -> ChatResult<()>;

    async fn channel(&self, slug: &str) -> ChatResult<Option<Channel>>;

    async fn channels(&self) -> ChatResult<Vec<Channel>>;

    /// Store a message in its channel and return it as stored.
    async fn append(&self, message: Message) -> ChatResult<Message>;

    /// Every message of a channel in publish order.
    async fn history(&self, slug: &str) -> ChatResult<Vec<Message>>;

    /// Open a cursor over a channel's messages.
    async fn tail(&self, slug: &str, start: CursorStart) -> ChatResult<Box<dyn MessageCursor>>;
}

/// A reader's position in one channel.
#[async_trait]
pub trait MessageCursor: Send {
    /// The next message after the current position, waiting up to `idle`
    /// for one to arrive (`None` waits indefinitely). `Ok(None)` means the
    /// wait timed out; the position is unchanged.
    async fn next(&mut self, idle: Option<Duration>) -> ChatResult<Option<Message>>;
}
