//! Backend selection.

use crate::error::ChatError;
use std::fmt;
use std::str::FromStr;

/// Which storage a service runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Process-local state, lost on exit.
    #[default]
    Memory,
    /// Redis Streams and hashes.
    Redis,
}

impl FromStr for BackendKind {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "redis" => Ok(BackendKind::Redis),
            _ => Err(ChatError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Memory => f.write_str("memory"),
            BackendKind::Redis => f.write_str("redis"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert_eq!(" Redis ".parse::<BackendKind>().unwrap(), BackendKind::Redis);
        assert!(matches!(
            "postgres".parse::<BackendKind>(),
            Err(ChatError::UnknownBackend(_))
        ));
    }

    #[test]
    fn test_display_parses_back() {
        for kind in [BackendKind::Memory, BackendKind::Redis] {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }
}
