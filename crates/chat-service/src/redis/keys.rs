//! Redis key layout.

/// Hash of every channel: field = slug, value = name.
pub const CHANNELS_KEY: &str = ":channels";

/// Stream holding a channel's messages.
pub fn messages_key(slug: &str) -> String {
    format!(":channel-{}:messages", slug)
}
