//! In-memory channel registry.

use super::store::ChannelLog;
use chat_protocol_types::Channel;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Channels in creation order, each with its own log.
#[derive(Default)]
pub(crate) struct ChannelRegistry {
    inner: RwLock<Entries>,
}

#[derive(Default)]
struct Entries {
    order: Vec<Channel>,
    logs: HashMap<String, Arc<ChannelLog>>,
}

impl ChannelRegistry {
    /// Register a channel. Returns `false` if the slug is taken.
    pub(crate) fn insert(&self, channel: &Channel) -> bool {
        let mut inner = self.inner.write();
        if inner.logs.contains_key(channel.slug()) {
            return false;
        }
        inner.logs.insert(
            channel.slug().to_string(),
            Arc::new(ChannelLog::new(channel.slug())),
        );
        inner.order.push(channel.clone());
        true
    }

    pub(crate) fn get(&self, slug: &str) -> Option<Channel> {
        self.inner
            .read()
            .order
            .iter()
            .find(|channel| channel.slug() == slug)
            .cloned()
    }

    pub(crate) fn list(&self) -> Vec<Channel> {
        self.inner.read().order.clone()
    }

    pub(crate) fn log(&self, slug: &str) -> Option<Arc<ChannelLog>> {
        self.inner.read().logs.get(slug).cloned()
    }
}
