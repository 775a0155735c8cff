//! Cursor over a channel stream.

use crate::backend::MessageCursor;
use crate::error::{ChatError, ChatResult};
use async_trait::async_trait;
use chat_protocol_types::Message;
use std::sync::Arc;
use std::time::Duration;
use stream_log::{EntryId, StreamEntry, StreamLog};
use tracing::{debug, warn};

/// Decode a stream entry into the message it carries.
pub(crate) fn decode(entry: &StreamEntry) -> ChatResult<Message> {
    Message::from_json(&entry.payload).map_err(|source| ChatError::Decode {
        entry_id: entry.id.to_string(),
        source,
    })
}

/// Last-seen stream id plus a dedicated reader connection.
pub(crate) struct StreamCursor {
    reader: Arc<dyn StreamLog>,
    key: String,
    position: EntryId,
}

impl StreamCursor {
    pub(crate) fn new(reader: Arc<dyn StreamLog>, key: String, position: EntryId) -> Self {
        debug!(stream = %key, position = %position, "Opened stream cursor");
        Self {
            reader,
            key,
            position,
        }
    }
}

#[async_trait]
impl MessageCursor for StreamCursor {
    async fn next(&mut self, idle: Option<Duration>) -> ChatResult<Option<Message>> {
        let entries = self
            .reader
            .read_after(&self.key, &self.position, 1, idle)
            .await?;

        let Some(entry) = entries.into_iter().next() else {
            return Ok(None);
        };

        // Advance first: a bad entry is reported once, not re-read forever.
        self.position = entry.id.clone();
        decode(&entry).map(Some).inspect_err(|e| {
            warn!(stream = %self.key, entry_id = %entry.id, error = %e, "Undecodable stream entry");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_protocol_types::MessageBase;
    use stream_log::MockRedis;

    #[tokio::test]
    async fn test_cursor_advances_past_each_entry() {
        let redis = MockRedis::new();
        for text in ["a", "b"] {
            let message = Message::new(MessageBase::text(text), "test", "testslug");
            redis.append("s", &message.to_json().unwrap()).await.unwrap();
        }

        let mut cursor = StreamCursor::new(Arc::new(redis), "s".to_string(), EntryId::beginning());
        let idle = Some(Duration::from_millis(10));
        assert_eq!(cursor.next(idle).await.unwrap().unwrap().body.text, "a");
        assert_eq!(cursor.next(idle).await.unwrap().unwrap().body.text, "b");
        assert!(cursor.next(idle).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bad_entry_is_reported_once() {
        let redis = MockRedis::new();
        redis.append("s", "not json").await.unwrap();
        let good = Message::new(MessageBase::text("ok"), "test", "testslug");
        redis.append("s", &good.to_json().unwrap()).await.unwrap();

        let mut cursor = StreamCursor::new(Arc::new(redis), "s".to_string(), EntryId::beginning());
        let idle = Some(Duration::from_millis(10));
        let err = cursor.next(idle).await.unwrap_err();
        assert!(matches!(err, ChatError::Decode { ref entry_id, .. } if entry_id == "1-0"));
        assert_eq!(cursor.next(idle).await.unwrap().unwrap().body.text, "ok");
    }
}
