//! Service facade: the operations request handlers call.

use crate::backend::{ChatBackend, CursorStart, MessageCursor};
use crate::error::{ChatError, ChatResult};
use crate::memory::MemoryBackend;
use chat_protocol_types::{Channel, Message, MessageBase, Notification, UserBase};
use futures_util::stream::{self, Stream};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Chat operations over a chosen backend.
#[derive(Clone)]
pub struct ChatService {
    backend: Arc<dyn ChatBackend>,
}

impl ChatService {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Service over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub async fn get_channels(&self) -> ChatResult<Vec<Channel>> {
        self.backend.channels().await
    }

    pub async fn get_channel(&self, slug: &str) -> ChatResult<Channel> {
        self.backend
            .channel(slug)
            .await?
            .ok_or_else(|| ChatError::ChannelNotFound(slug.to_string()))
    }

    pub async fn create_channel(&self, slug: &str, name: &str) -> ChatResult<Channel> {
        let channel = Channel::new(slug, name)?;
        self.backend.insert_channel(&channel).await?;
        info!(channel = %slug, name = %name, "Created channel");
        Ok(channel)
    }

    pub async fn get_messages(&self, channel_slug: &str) -> ChatResult<Vec<Message>> {
        self.backend.history(channel_slug).await
    }

    /// Publish a message from `user`, stamped now.
    pub async fn send_message(
        &self,
        channel_slug: &str,
        user: &UserBase,
        message: MessageBase,
    ) -> ChatResult<Message> {
        let message = Message::new(message, user.username(), channel_slug);
        let stored = self.backend.append(message).await?;
        debug!(channel = %channel_slug, sender = %user.username(), "Message sent");
        Ok(stored)
    }

    /// Subscribe to a channel.
    ///
    /// With `replay_backlog` the subscription starts with every stored
    /// message, otherwise only messages published after this call. Each
    /// `idle_timeout` that passes without a message yields
    /// [`Notification::IdleTick`]; `None` waits indefinitely.
    pub async fn subscribe(
        &self,
        channel_slug: &str,
        idle_timeout: Option<Duration>,
        replay_backlog: bool,
    ) -> ChatResult<Subscription> {
        let start = if replay_backlog {
            CursorStart::Beginning
        } else {
            CursorStart::Now
        };
        let cursor = self.backend.tail(channel_slug, start).await?;
        debug!(channel = %channel_slug, replay_backlog, "Subscribed");

        Ok(Subscription {
            channel: channel_slug.to_string(),
            cursor,
            idle_timeout,
        })
    }
}

/// A live subscription to one channel. Dropping it releases everything it
/// holds.
pub struct Subscription {
    channel: String,
    cursor: Box<dyn MessageCursor>,
    idle_timeout: Option<Duration>,
}

impl Subscription {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Wait for the next message or idle tick.
    pub async fn next(&mut self) -> ChatResult<Notification> {
        match self.cursor.next(self.idle_timeout).await? {
            Some(message) => Ok(Notification::Message(message)),
            None => Ok(Notification::IdleTick),
        }
    }

    /// Adapt into a stream. The stream ends after yielding a terminal
    /// error; other errors are yielded and the subscription continues.
    pub fn into_stream(self) -> impl Stream<Item = ChatResult<Notification>> + Send {
        stream::unfold(Some(self), |state| async move {
            let mut subscription = state?;
            match subscription.next().await {
                Ok(notification) => Some((Ok(notification), Some(subscription))),
                Err(e) if e.is_terminal() => Some((Err(e), None)),
                Err(e) => Some((Err(e), Some(subscription))),
            }
        })
    }
}
