//! Per-channel message log with wake-ups for waiting readers.

use crate::backend::MessageCursor;
use crate::error::{ChatError, ChatResult};
use async_trait::async_trait;
use chat_protocol_types::Message;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{timeout_at, Instant};

/// Append-only message list for one channel.
pub(crate) struct ChannelLog {
    slug: String,
    messages: RwLock<Vec<Message>>,
    appended: Notify,
}

impl ChannelLog {
    pub(crate) fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            messages: RwLock::new(Vec::new()),
            appended: Notify::new(),
        }
    }

    /// Append and wake every waiting reader.
    ///
    /// Timestamps never go backwards within a channel: a message stamped
    /// earlier than its predecessor takes the predecessor's timestamp.
    pub(crate) fn append(&self, mut message: Message) -> Message {
        {
            let mut messages = self.messages.write();
            if let Some(last) = messages.last() {
                if message.timestamp < last.timestamp {
                    message.timestamp = last.timestamp;
                }
            }
            messages.push(message.clone());
        }
        self.appended.notify_waiters();
        message
    }

    pub(crate) fn snapshot(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.read().len()
    }

    /// The message at `position`, `None` if the reader is caught up.
    fn at(&self, position: usize) -> ChatResult<Option<Message>> {
        let messages = self.messages.read();
        if position > messages.len() {
            return Err(ChatError::StaleWaiter {
                channel: self.slug.clone(),
                position,
                len: messages.len(),
            });
        }
        Ok(messages.get(position).cloned())
    }
}

/// A reader's index into a [`ChannelLog`].
pub(crate) struct MemoryCursor {
    log: Arc<ChannelLog>,
    position: usize,
}

impl MemoryCursor {
    pub(crate) fn new(log: Arc<ChannelLog>, position: usize) -> Self {
        Self { log, position }
    }
}

#[async_trait]
impl MessageCursor for MemoryCursor {
    async fn next(&mut self, idle: Option<Duration>) -> ChatResult<Option<Message>> {
        let deadline = idle.map(|idle| Instant::now() + idle);

        loop {
            // Arm the wake-up before looking, so an append between the look
            // and the wait is not missed.
            let notified = self.log.appended.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(message) = self.log.at(self.position)? {
                self.position += 1;
                return Ok(Some(message));
            }

            match deadline {
                Some(deadline) => {
                    if timeout_at(deadline, notified).await.is_err() {
                        return Ok(None);
                    }
                }
                None => notified.await,
            }
        }
    }
}
