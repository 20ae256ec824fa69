//! Persistent error log.
//!
//! Every failure in a run — fatal or not — is duplicated into an append-only
//! log file, one line per error:
//!
//! ```text
//! [2025-03-01T09:00:00Z] ERROR: image fetch failed: connection refused
//! ```
//!
//! The log is an injected collaborator ([`ErrorLog`]) rather than a global
//! file handle, so tests substitute [`MemoryErrorLog`] and assert on captured
//! lines. Appending never returns an error: the log must not be able to take
//! the pipeline down.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};

/// Append-only error reporting collaborator.
pub trait ErrorLog {
    /// Record one error message. Infallible by contract — implementations
    /// swallow their own I/O problems.
    fn append(&self, message: &str);
}

/// Format a log line: `[{ISO-8601}] ERROR: {message}`.
fn format_line(message: &str) -> String {
    let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    format!("[{stamp}] ERROR: {message}\n")
}

/// File-backed log. The file is created on first append.
pub struct FileErrorLog {
    path: PathBuf,
}

impl FileErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ErrorLog for FileErrorLog {
    fn append(&self, message: &str) {
        let line = format_line(message);
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

/// In-memory log double for tests.
#[derive(Default)]
pub struct MemoryErrorLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages appended so far, without timestamps.
    pub fn messages(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ErrorLog for MemoryErrorLog {
    fn append(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}
