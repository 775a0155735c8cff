//! Append-only stream log and key/value map.
//!
//! Two capabilities, both modeled on Redis:
//!
//! - [`StreamLog`]: append-only entries per key, each with a monotonically
//!   increasing [`EntryId`], plus blocking "read after position" (Redis Streams:
//!   `XADD`, `XRANGE`, `XREVRANGE`, `XREAD BLOCK`).
//! - [`HashStore`]: a flat string map per key (Redis hashes: `HSETNX`, `HGET`,
//!   `HGETALL`).
//!
//! [`RedisLog`] implements both against a live server. With the
//! `test-support` feature, `MockRedis` implements both in-process.
//!
//! # Cursor model
//!
//! ```text
//!   key: :channel-general:messages
//!   ┌────────┬────────┬────────┬────────┐
//!   │ 1-0    │ 2-0    │ 3-0    │ 4-0    │  <- append
//!   └────────┴────────┴────────┴────────┘
//!        ^ read_after("1-0", count=1) returns 2-0
//! ```
//!
//! Consumers hold their own position; the log keeps no consumer state.

mod entry;
mod error;
#[cfg(any(test, feature = "test-support"))]
mod mock;
mod redis_log;

pub use entry::{EntryId, StreamEntry, PAYLOAD_FIELD};
pub use error::{LogError, LogResult};
#[cfg(any(test, feature = "test-support"))]
pub use mock::MockRedis;
pub use redis_log::RedisLog;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Append-only log of string payloads, keyed by stream name.
#[async_trait]
pub trait StreamLog: Send + Sync {
    /// Append a payload and return the id assigned to it.
    async fn append(&self, key: &str, payload: &str) -> LogResult<EntryId>;

    /// Every entry of the stream, oldest first. Empty for a missing stream.
    async fn range(&self, key: &str) -> LogResult<Vec<StreamEntry>>;

    /// Id of the newest entry, if any.
    async fn last_id(&self, key: &str) -> LogResult<Option<EntryId>>;

    /// Up to `count` entries strictly after `after`, oldest first.
    ///
    /// If none are available, waits up to `block` for one to be appended
    /// (`None` waits indefinitely) and returns an empty vec on timeout.
    async fn read_after(
        &self,
        key: &str,
        after: &EntryId,
        count: usize,
        block: Option<Duration>,
    ) -> LogResult<Vec<StreamEntry>>;

    /// A handle suitable for long blocking reads.
    ///
    /// Blocking reads hold their connection for the whole wait, so a
    /// subscriber asks for its own reader instead of sharing this one.
    async fn reader(&self) -> LogResult<Arc<dyn StreamLog>>;
}

/// String map per key.
#[async_trait]
pub trait HashStore: Send + Sync {
    /// Set `field` only if it does not exist yet. Returns whether it was set.
    async fn set_if_absent(&self, key: &str, field: &str, value: &str) -> LogResult<bool>;

    async fn get(&self, key: &str, field: &str) -> LogResult<Option<String>>;

    /// All `(field, value)` pairs. Order is unspecified.
    async fn get_all(&self, key: &str) -> LogResult<Vec<(String, String)>>;
}
