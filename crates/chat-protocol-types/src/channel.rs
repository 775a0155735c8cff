//! Chat channels.

use crate::error::{non_empty, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

/// A chat channel. Immutable once created; `slug` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ChannelFields")]
pub struct Channel {
    slug: String,
    name: String,
}

#[derive(Deserialize)]
struct ChannelFields {
    slug: String,
    name: String,
}

impl TryFrom<ChannelFields> for Channel {
    type Error = ValidationError;

    fn try_from(fields: ChannelFields) -> ValidationResult<Self> {
        Channel::new(fields.slug, fields.name)
    }
}

impl Channel {
    /// Create a channel, rejecting an empty slug or name.
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> ValidationResult<Self> {
        let slug = slug.into();
        let name = name.into();
        non_empty("slug", &slug)?;
        non_empty("name", &name)?;
        Ok(Self { slug, name })
    }

    /// The unique channel key.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_new() {
        let channel = Channel::new("testslug", "test").unwrap();
        assert_eq!(channel.slug(), "testslug");
        assert_eq!(channel.name(), "test");
    }

    #[test]
    fn test_channel_rejects_empty_fields() {
        assert_eq!(
            Channel::new("", "test").unwrap_err(),
            ValidationError::Empty("slug")
        );
        assert_eq!(
            Channel::new("slug", "").unwrap_err(),
            ValidationError::Empty("name")
        );
    }

    #[test]
    fn test_channel_json() {
        let channel = Channel::new("general", "General").unwrap();
        let json = serde_json::to_string(&channel).unwrap();
        assert_eq!(json, r#"{"slug":"general","name":"General"}"#);

        let parsed: Channel = serde_json::from_str(r#"{"name":"n","slug":"s"}"#).unwrap();
        assert_eq!(parsed, Channel::new("s", "n").unwrap());
    }

    #[test]
    fn test_channel_deserialize_validates() {
        let result: Result<Channel, _> = serde_json::from_str(r#"{"slug":"","name":"x"}"#);
        assert!(result.is_err());
    }
}
