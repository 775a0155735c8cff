//! In-memory backend.
//!
//! Each channel keeps an append-only message list. A cursor is an index into
//! that list; publishers wake waiting cursors after every append.

mod registry;
mod store;

use crate::backend::{ChatBackend, CursorStart, MessageCursor};
use crate::error::{ChatError, ChatResult};
use async_trait::async_trait;
use chat_protocol_types::{Channel, Message};
use registry::ChannelRegistry;
use std::sync::Arc;
use store::{ChannelLog, MemoryCursor};

/// Process-local channels and messages.
#[derive(Default)]
pub struct MemoryBackend {
    registry: ChannelRegistry,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self, slug: &str) -> ChatResult<Arc<ChannelLog>> {
        self.registry
            .log(slug)
            .ok_or_else(|| ChatError::ChannelNotFound(slug.to_string()))
    }
}

#[async_trait]
impl ChatBackend for MemoryBackend {
    async fn insert_channel(&self, channel: &Channel) -> ChatResult<()> {
        if !self.registry.insert(channel) {
            return Err(ChatError::DuplicateChannel(channel.slug().to_string()));
        }
        Ok(())
    }

    async fn channel(&self, slug: &str) -> ChatResult<Option<Channel>> {
        Ok(self.registry.get(slug))
    }

    async fn channels(&self) -> ChatResult<Vec<Channel>> {
        Ok(self.registry.list())
    }

    async fn append(&self, message: Message) -> ChatResult<Message> {
        Ok(self.log(&message.channel_slug)?.append(message))
    }

    async fn history(&self, slug: &str) -> ChatResult<Vec<Message>> {
        Ok(self.log(slug)?.snapshot())
    }

    async fn tail(&self, slug: &str, start: CursorStart) -> ChatResult<Box<dyn MessageCursor>> {
        let log = self.log(slug)?;
        let position = match start {
            CursorStart::Beginning => 0,
            CursorStart::Now => log.len(),
        };
        Ok(Box::new(MemoryCursor::new(log, position)))
    }
}
