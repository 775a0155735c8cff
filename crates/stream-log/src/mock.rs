//! In-process stand-in for Redis streams and hashes.
//!
//! Ids are assigned as `{n}-0` from a shared counter. Blocking reads wake on
//! every append, across all keys.

use crate::entry::{EntryId, StreamEntry};
use crate::error::{LogError, LogResult};
use crate::{HashStore, StreamLog};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{timeout_at, Instant};

#[derive(Default)]
struct Inner {
    streams: Mutex<HashMap<String, Vec<StreamEntry>>>,
    hashes: Mutex<HashMap<String, Vec<(String, String)>>>,
    next_id: AtomicU64,
    appended: Notify,
    readers_opened: AtomicUsize,
    unavailable: AtomicBool,
}

/// Simulated Redis. Clones share state.
#[derive(Clone, Default)]
pub struct MockRedis {
    inner: Arc<Inner>,
}

impl MockRedis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dedicated readers handed out by [`StreamLog::reader`].
    pub fn readers_opened(&self) -> usize {
        self.inner.readers_opened.load(AtomicOrdering::SeqCst)
    }

    /// Make every subsequent call fail, as if the server went away.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    /// Number of entries stored under `key`.
    pub fn stream_len(&self, key: &str) -> usize {
        self.inner
            .streams
            .lock()
            .get(key)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn check_available(&self) -> LogResult<()> {
        if self.inner.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(LogError::Protocol("mock redis unavailable".to_string()));
        }
        Ok(())
    }

    fn entries_after(&self, key: &str, after: &EntryId, count: usize) -> Vec<StreamEntry> {
        let streams = self.inner.streams.lock();
        streams
            .get(key)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.id > *after)
                    .take(count)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl StreamLog for MockRedis {
    async fn append(&self, key: &str, payload: &str) -> LogResult<EntryId> {
        self.check_available()?;
        let n = self.inner.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let id = EntryId::parse(format!("{}-0", n))?;

        self.inner
            .streams
            .lock()
            .entry(key.to_string())
            .or_default()
            .push(StreamEntry {
                id: id.clone(),
                payload: payload.to_string(),
            });
        self.inner.appended.notify_waiters();
        Ok(id)
    }

    async fn range(&self, key: &str) -> LogResult<Vec<StreamEntry>> {
        self.check_available()?;
        Ok(self
            .inner
            .streams
            .lock()
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn last_id(&self, key: &str) -> LogResult<Option<EntryId>> {
        self.check_available()?;
        Ok(self
            .inner
            .streams
            .lock()
            .get(key)
            .and_then(|entries| entries.last())
            .map(|entry| entry.id.clone()))
    }

    async fn read_after(
        &self,
        key: &str,
        after: &EntryId,
        count: usize,
        block: Option<Duration>,
    ) -> LogResult<Vec<StreamEntry>> {
        let deadline = block.map(|duration| Instant::now() + duration);

        loop {
            self.check_available()?;

            // Register before checking so an append in between still wakes us.
            let notified = self.inner.appended.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let found = self.entries_after(key, after, count);
            if !found.is_empty() {
                return Ok(found);
            }

            match deadline {
                Some(deadline) => {
                    if timeout_at(deadline, notified).await.is_err() {
                        return Ok(Vec::new());
                    }
                }
                None => notified.await,
            }
        }
    }

    async fn reader(&self) -> LogResult<Arc<dyn StreamLog>> {
        self.check_available()?;
        self.inner.readers_opened.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl HashStore for MockRedis {
    async fn set_if_absent(&self, key: &str, field: &str, value: &str) -> LogResult<bool> {
        self.check_available()?;
        let mut hashes = self.inner.hashes.lock();
        let fields = hashes.entry(key.to_string()).or_default();
        if fields.iter().any(|(existing, _)| existing == field) {
            return Ok(false);
        }
        fields.push((field.to_string(), value.to_string()));
        Ok(true)
    }

    async fn get(&self, key: &str, field: &str) -> LogResult<Option<String>> {
        self.check_available()?;
        Ok(self.inner.hashes.lock().get(key).and_then(|fields| {
            fields
                .iter()
                .find(|(existing, _)| existing == field)
                .map(|(_, value)| value.clone())
        }))
    }

    async fn get_all(&self, key: &str) -> LogResult<Vec<(String, String)>> {
        self.check_available()?;
        Ok(self.inner.hashes.lock().get(key).cloned().unwrap_or_default())
    }
}
