//! Run log sinks.
//!
//! Every event of a reconciliation pass is written as one line,
//! `[YYYY-MM-DD HH:MM:SS]: <Level>: <message>`, to whichever sinks are
//! configured. The level prefix lets a console front end pick a style.

use crate::cache::touch;
use crate::error::Result;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Severity prefix of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Success => "Success",
            Level::Info => "Info",
            Level::Warning => "Warning",
            Level::Error => "Error",
        };
        f.write_str(label)
    }
}

/// Local time with second precision, as used by the log and cache files.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Destination for run log entries.
pub trait LogSink: Send + Sync {
    /// Record one entry. The message does not include the level prefix.
    fn record(&self, level: Level, message: &str) -> Result<()>;
}

/// Appends timestamped lines to a file.
#[derive(Debug)]
pub struct FileLog {
    path: PathBuf,
}

impl FileLog {
    /// Make sure the log file exists and is writable.
    pub fn open(path: &Path) -> Result<Self> {
        touch(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLog {
    fn record(&self, level: Level, message: &str) -> Result<()> {
        let mut file = OpenOptions::new().append(true).create(true).open(&self.path)?;
        writeln!(file, "[{}]: {}: {}", timestamp(), level, message)?;
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullLog;

impl LogSink for NullLog {
    fn record(&self, _level: Level, _message: &str) -> Result<()> {
        Ok(())
    }
}

/// The run log: a file (or no-op) sink plus an optional console echo.
pub struct Journal {
    file: Box<dyn LogSink>,
    echo: Option<Arc<dyn LogSink>>,
}

impl Journal {
    pub fn new(file: Box<dyn LogSink>) -> Self {
        Self { file, echo: None }
    }

    pub fn with_echo(mut self, echo: Option<Arc<dyn LogSink>>) -> Self {
        self.echo = echo;
        self
    }

    /// Write an entry everywhere. Sink failures are reported, never fatal.
    pub fn log(&self, level: Level, message: &str) {
        if let Err(e) = self.file.record(level, message) {
            tracing::warn!("Failed to append to run log: {}", e);
        }
        if let Some(echo) = &self.echo {
            if let Err(e) = echo.record(level, message) {
                tracing::warn!("Failed to echo log entry: {}", e);
            }
        }
    }

    pub fn success(&self, message: &str) {
        self.log(Level::Success, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}
