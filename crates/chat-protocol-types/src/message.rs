//! Chat messages and subscription notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub text: String,
}

/// What a sender submits: the body only. Sender, channel and timestamp are
/// filled in at publish time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBase {
    pub body: MessageBody,
}

impl MessageBase {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            body: MessageBody { text: text.into() },
        }
    }
}

/// A published message.
///
/// This is also the durable log payload. Field names and order match the
/// JSON written by every other producer of the same log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub body: MessageBody,
    pub sender_username: String,
    pub channel_slug: String,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a message stamped with the current time.
    pub fn new(base: MessageBase, sender_username: &str, channel_slug: &str) -> Self {
        Self {
            body: base.body,
            sender_username: sender_username.to_string(),
            channel_slug: channel_slug.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from the JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Compare everything except the timestamp.
    pub fn same_content(&self, other: &Message) -> bool {
        self.body == other.body
            && self.sender_username == other.sender_username
            && self.channel_slug == other.channel_slug
    }
}

/// One step of a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A message published to the channel.
    Message(Message),
    /// The idle timeout elapsed with nothing published.
    IdleTick,
}

impl Notification {
    /// The message, if this is not an idle tick.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Notification::Message(message) => Some(message),
            Notification::IdleTick => None,
        }
    }

    pub fn into_message(self) -> Option<Message> {
        match self {
            Notification::Message(message) => Some(message),
            Notification::IdleTick => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Notification::IdleTick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_json_field_order() {
        let mut message = Message::new(MessageBase::text("hello"), "alice", "general");
        message.timestamp = crate::timestamp::parse("2024-01-15T10:30:00Z").unwrap();

        let json = message.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"body":{"text":"hello"},"sender_username":"alice","channel_slug":"general","timestamp":"2024-01-15T10:30:00.000000Z"}"#
        );
    }

    #[test]
    fn test_message_reads_naive_timestamp() {
        let json = r#"{"body":{"text":"test"},"sender_username":"test","channel_slug":"testslug","timestamp":"2023-04-20T18:01:02.345678"}"#;
        let message = Message::from_json(json).unwrap();

        assert_eq!(message.body.text, "test");
        assert_eq!(message.channel_slug, "testslug");
        assert_eq!(
            crate::timestamp::format(&message.timestamp),
            "2023-04-20T18:01:02.345678Z"
        );
    }

    #[test]
    fn test_message_rejects_missing_field() {
        let json = r#"{"body":{"text":"test"},"channel_slug":"testslug","timestamp":"2023-04-20T18:01:02"}"#;
        assert!(Message::from_json(json).is_err());
    }

    #[test]
    fn test_same_content_ignores_timestamp() {
        let a = Message::new(MessageBase::text("x"), "u", "c");
        let mut b = a.clone();
        b.timestamp = b.timestamp + chrono::Duration::seconds(5);
        assert!(a.same_content(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_notification_accessors() {
        let message = Message::new(MessageBase::text("x"), "u", "c");
        let notification = Notification::Message(message.clone());
        assert_eq!(notification.message(), Some(&message));
        assert!(!notification.is_idle());
        assert!(Notification::IdleTick.is_idle());
        assert_eq!(Notification::IdleTick.into_message(), None);
    }
}
