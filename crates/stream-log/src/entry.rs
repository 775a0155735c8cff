//! Stream entries and their ids.

use crate::error::{LogError, LogResult};
use std::cmp::Ordering;
use std::fmt;

/// Field name under which each entry stores its payload.
pub const PAYLOAD_FIELD: &str = "data";

/// A stream entry id of the form `<millis>-<seq>` (e.g. `1700000000000-0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryId(String);

impl EntryId {
    /// The position before every entry (`0-0`).
    pub fn beginning() -> Self {
        Self("0-0".to_string())
    }

    /// Wrap a raw id, checking its shape.
    pub fn parse(raw: impl Into<String>) -> LogResult<Self> {
        let raw = raw.into();
        split_id(&raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `(millis, seq)` pair; ids always pass through [`EntryId::parse`].
    fn parts(&self) -> (u64, u64) {
        split_id(&self.0).unwrap_or((0, 0))
    }
}

fn split_id(raw: &str) -> LogResult<(u64, u64)> {
    let malformed = || LogError::Protocol(format!("Malformed stream id: {}", raw));
    let (millis, seq) = raw.split_once('-').ok_or_else(malformed)?;
    let millis = millis.parse().map_err(|_| malformed())?;
    let seq = seq.parse().map_err(|_| malformed())?;
    Ok((millis, seq))
}

impl Ord for EntryId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts().cmp(&other.parts())
    }
}

impl PartialOrd for EntryId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry read from a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    pub id: EntryId,
    pub payload: String,
}
