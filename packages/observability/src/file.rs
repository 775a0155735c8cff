//! Append-only JSONL log file.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// `~/.channel-chat/logs/chat.jsonl`, or `./.channel-chat/logs/chat.jsonl`
/// without a home directory.
pub fn default_log_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.extend([".channel-chat", "logs", "chat.jsonl"]);
    path
}

/// Shared handle to an open log file.
///
/// The file is opened with `O_APPEND` and every buffer handed to `write` goes
/// out in a single unbuffered call, so a whole line lands together even when
/// several processes share the file.
#[derive(Clone)]
pub struct LogFile {
    file: Arc<Mutex<File>>,
}

impl LogFile {
    /// Open `path` for appending, creating missing parent directories.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.lock().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("logs").join("chat.jsonl");

        LogFile::open(&path).unwrap().write_all(b"{}\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.jsonl");

        let mut first = LogFile::open(&path).unwrap();
        let mut second = LogFile::open(&path).unwrap();
        first.write_all(b"a\n").unwrap();
        second.write_all(b"b\n").unwrap();
        first.make_writer().write_all(b"c\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn test_default_log_path() {
        assert!(default_log_path().ends_with(".channel-chat/logs/chat.jsonl"));
    }
}
