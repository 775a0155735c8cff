//! Redis Streams backend.
//!
//! Channels live in the hash [`CHANNELS_KEY`]; each channel's messages are a
//! stream at [`messages_key`], one JSON-encoded [`Message`] per entry. A
//! subscription is a caller-held stream id; nothing is stored server-side
//! per subscriber.

mod cursor;
mod keys;

pub use keys::{messages_key, CHANNELS_KEY};

use crate::backend::{ChatBackend, CursorStart, MessageCursor};
use crate::error::{ChatError, ChatResult};
use async_trait::async_trait;
use chat_protocol_types::{Channel, Message};
use cursor::{decode, StreamCursor};
use std::sync::Arc;
use stream_log::{EntryId, HashStore, RedisLog, StreamLog};
use tracing::debug;

/// Channels and messages stored in Redis.
pub struct RedisBackend {
    log: Arc<dyn StreamLog>,
    hashes: Arc<dyn HashStore>,
}

impl RedisBackend {
    pub fn new(log: Arc<dyn StreamLog>, hashes: Arc<dyn HashStore>) -> Self {
        Self { log, hashes }
    }

    /// Backend over a single Redis connection used for both streams and hashes.
    pub fn from_redis(redis: RedisLog) -> Self {
        let redis = Arc::new(redis);
        Self::new(redis.clone(), redis)
    }

    async fn require_channel(&self, slug: &str) -> ChatResult<()> {
        match self.hashes.get(CHANNELS_KEY, slug).await? {
            Some(_) => Ok(()),
            None => Err(ChatError::ChannelNotFound(slug.to_string())),
        }
    }
}

#[async_trait]
impl ChatBackend for RedisBackend {
    async fn insert_channel(&self, channel: &Channel) -> ChatResult<()> {
        let created = self
            .hashes
            .set_if_absent(CHANNELS_KEY, channel.slug(), channel.name())
            .await?;
        if !created {
            return Err(ChatError::DuplicateChannel(channel.slug().to_string()));
        }
        Ok(())
    }

    async fn channel(&self, slug: &str) -> ChatResult<Option<Channel>> {
        match self.hashes.get(CHANNELS_KEY, slug).await? {
            Some(name) => Ok(Some(Channel::new(slug, name)?)),
            None => Ok(None),
        }
    }

    async fn channels(&self) -> ChatResult<Vec<Channel>> {
        self.hashes
            .get_all(CHANNELS_KEY)
            .await?
            .into_iter()
            .map(|(slug, name)| Channel::new(slug, name).map_err(ChatError::from))
            .collect()
    }

    async fn append(&self, message: Message) -> ChatResult<Message> {
        self.require_channel(&message.channel_slug).await?;
        let payload = message.to_json().map_err(ChatError::Encode)?;
        let id = self
            .log
            .append(&messages_key(&message.channel_slug), &payload)
            .await?;
        debug!(channel = %message.channel_slug, entry_id = %id, "Stored message");
        Ok(message)
    }

    async fn history(&self, slug: &str) -> ChatResult<Vec<Message>> {
        self.require_channel(slug).await?;
        self.log
            .range(&messages_key(slug))
            .await?
            .iter()
            .map(decode)
            .collect()
    }

    async fn tail(&self, slug: &str, start: CursorStart) -> ChatResult<Box<dyn MessageCursor>> {
        self.require_channel(slug).await?;
        let key = messages_key(slug);
        let position = match start {
            CursorStart::Beginning => EntryId::beginning(),
            CursorStart::Now => self
                .log
                .last_id(&key)
                .await?
                .unwrap_or_else(EntryId::beginning),
        };
        let reader = self.log.reader().await?;
        Ok(Box::new(StreamCursor::new(reader, key, position)))
    }
}
