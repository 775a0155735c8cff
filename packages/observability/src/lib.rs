//! Tracing setup for the channel-chat binaries.
//!
//! Call [`init`] or [`init_with_config`] once at startup, then log through the
//! `tracing` macros. Output goes to a compact stderr layer, a JSONL file
//! ([`JsonLayer`] over a [`LogFile`]), or both:
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "chat-server".into(),
//!     log_path: Some(observability::default_log_path()),
//!     also_stderr: true,
//!     ..Default::default()
//! });
//! ```
//!
//! `RUST_LOG` overrides [`LogConfig::default_level`] for every layer.

mod file;
mod json_layer;

use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub use file::{default_log_path, LogFile};
pub use json_layer::{JsonLayer, LogEntry};

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Written into the `service` key of each JSON line.
    pub service_name: String,
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `chat_service=debug,info`.
    pub default_level: String,
    /// JSONL destination. `None` logs to stderr only.
    pub log_path: Option<PathBuf>,
    /// Keep the stderr layer when a log file is in use.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: env!("CARGO_PKG_NAME").into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Stderr-only logging at `info`.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Install the global subscriber.
///
/// A log file that cannot be opened is not fatal: stderr logging is enabled
/// instead and the failure becomes the first event.
pub fn init_with_config(config: LogConfig) {
    let opened = config.log_path.as_deref().map(LogFile::open);

    let (log_file, open_error) = match opened {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let use_stderr = log_file.is_none() || config.also_stderr;

    let json = log_file.map(|file| {
        JsonLayer::new(config.service_name.clone(), file)
            .with_filter(env_filter(&config.default_level))
    });
    let stderr = use_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    tracing_subscriber::registry().with(json).with(stderr).init();

    let Some(log_path) = config.log_path else {
        return;
    };
    match open_error {
        Some(e) => tracing::warn!(
            log_path = %log_path.display(),
            error = %e,
            "Could not open log file, logging to stderr"
        ),
        None => tracing::info!(
            log_path = %log_path.display(),
            service = %config.service_name,
            "Logging to file"
        ),
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
