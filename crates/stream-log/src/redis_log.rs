//! Redis implementation of [`StreamLog`] and [`HashStore`].
//!
//! Streams map to `XADD` / `XRANGE` / `XREVRANGE` / `XREAD`, hashes to
//! `HSETNX` / `HGET` / `HGETALL`. Payloads are stored in the single field
//! [`PAYLOAD_FIELD`].

use crate::entry::{EntryId, StreamEntry, PAYLOAD_FIELD};
use crate::error::{LogError, LogResult};
use crate::{HashStore, StreamLog};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::streams::{StreamId, StreamRangeReply, StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, Client};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Redis-backed stream log and hash store.
#[derive(Clone)]
pub struct RedisLog {
    client: Client,
    conn: MultiplexedConnection,
}

impl RedisLog {
    /// Connect to Redis.
    pub async fn connect(redis_url: &str) -> LogResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Connected to Redis");
        Ok(Self { client, conn })
    }

    /// Open a second connection to the same server.
    pub async fn reconnect(&self) -> LogResult<Self> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(Self {
            client: self.client.clone(),
            conn,
        })
    }
}

fn entry_from_stream_id(stream_id: StreamId) -> LogResult<StreamEntry> {
    let payload: String = stream_id.get(PAYLOAD_FIELD).ok_or_else(|| {
        LogError::Protocol(format!(
            "Stream entry {} missing {} field",
            stream_id.id, PAYLOAD_FIELD
        ))
    })?;
    Ok(StreamEntry {
        id: EntryId::parse(stream_id.id)?,
        payload,
    })
}

/// `BLOCK` argument in milliseconds. `0` means wait forever, so a finite
/// wait is never rounded down to it.
fn block_millis(block: Option<Duration>) -> usize {
    match block {
        Some(duration) => duration.as_millis().max(1) as usize,
        None => 0,
    }
}

#[async_trait]
impl StreamLog for RedisLog {
    async fn append(&self, key: &str, payload: &str) -> LogResult<EntryId> {
        let mut conn = self.conn.clone();
        let id: String = conn.xadd(key, "*", &[(PAYLOAD_FIELD, payload)]).await?;
        debug!(stream = %key, entry_id = %id, "Appended entry");
        EntryId::parse(id)
    }

    async fn range(&self, key: &str) -> LogResult<Vec<StreamEntry>> {
        let mut conn = self.conn.clone();
        let reply: StreamRangeReply = conn.xrange_all(key).await?;
        reply.ids.into_iter().map(entry_from_stream_id).collect()
    }

    async fn last_id(&self, key: &str) -> LogResult<Option<EntryId>> {
        let mut conn = self.conn.clone();
        let reply: StreamRangeReply = conn.xrevrange_count(key, "+", "-", 1).await?;
        reply
            .ids
            .into_iter()
            .next()
            .map(|stream_id| EntryId::parse(stream_id.id))
            .transpose()
    }

    async fn read_after(
        &self,
        key: &str,
        after: &EntryId,
        count: usize,
        block: Option<Duration>,
    ) -> LogResult<Vec<StreamEntry>> {
        let mut conn = self.conn.clone();
        let options = StreamReadOptions::default()
            .count(count)
            .block(block_millis(block));

        // XREAD COUNT n BLOCK ms STREAMS key id
        // A timed-out block replies with nil.
        let reply: Option<StreamReadReply> = conn
            .xread_options(&[key], &[after.as_str()], &options)
            .await?;

        let Some(reply) = reply else {
            return Ok(Vec::new());
        };

        reply
            .keys
            .into_iter()
            .flat_map(|stream| stream.ids)
            .map(entry_from_stream_id)
            .collect()
    }

    async fn reader(&self) -> LogResult<Arc<dyn StreamLog>> {
        Ok(Arc::new(self.reconnect().await?))
    }
}

#[async_trait]
impl HashStore for RedisLog {
    async fn set_if_absent(&self, key: &str, field: &str, value: &str) -> LogResult<bool> {
        let mut conn = self.conn.clone();
        let created: bool = conn.hset_nx(key, field, value).await?;
        Ok(created)
    }

    async fn get(&self, key: &str, field: &str) -> LogResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.hget(key, field).await?;
        Ok(value)
    }

    async fn get_all(&self, key: &str) -> LogResult<Vec<(String, String)>> {
        let mut conn = self.conn.clone();
        let values: HashMap<String, String> = conn.hgetall(key).await?;
        Ok(values.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_millis() {
        assert_eq!(block_millis(None), 0);
        assert_eq!(block_millis(Some(Duration::from_millis(1500))), 1500);
        assert_eq!(block_millis(Some(Duration::from_micros(10))), 1);
        assert_eq!(block_millis(Some(Duration::ZERO)), 1);
    }

    #[test]
    fn test_entry_from_stream_id() {
        let mut map = HashMap::new();
        map.insert(
            PAYLOAD_FIELD.to_string(),
            redis::Value::BulkString(b"{\"x\":1}".to_vec()),
        );
        let entry = entry_from_stream_id(StreamId {
            id: "1700000000000-0".to_string(),
            map,
        })
        .unwrap();

        assert_eq!(entry.id.as_str(), "1700000000000-0");
        assert_eq!(entry.payload, "{\"x\":1}");
    }

    #[test]
    fn test_entry_without_payload_field_is_protocol_error() {
        let entry = entry_from_stream_id(StreamId {
            id: "1-0".to_string(),
            map: HashMap::new(),
        });
        assert!(matches!(entry, Err(LogError::Protocol(_))));
    }
}
