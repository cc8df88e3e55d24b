//! Last-applied IP cache.
//!
//! The cache file holds a single line without trailing newline:
//!
//! ```text
//! [2024-05-01 12:00:00]: 203.0.113.7
//! ```
//!
//! The timestamp sits at characters 1..20 and the address starts at
//! character 23. Older releases read the file by those offsets, so the
//! layout must not change.

use crate::error::{DdnsError, Result};
use crate::journal::timestamp;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

const TIMESTAMP_RANGE: std::ops::Range<usize> = 1..20;
const IP_OFFSET: usize = 23;

/// The persisted (timestamp, ip) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub timestamp: String,
    pub ip: String,
}

impl CacheRecord {
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp(),
            ip: ip.into(),
        }
    }

    pub fn render(&self) -> String {
        format!("[{}]: {}", self.timestamp, self.ip)
    }

    /// Parse the first line of a cache file; `None` if it holds no usable record.
    pub fn parse(content: &str) -> Option<Self> {
        let line = content.lines().next()?;
        if line.is_empty() {
            return None;
        }

        let well_formed = line.starts_with('[') && line.get(20..IP_OFFSET) == Some("]: ");
        let record = match (line.get(TIMESTAMP_RANGE), line.get(IP_OFFSET..)) {
            (Some(ts), Some(ip)) if well_formed && !ip.is_empty() => Self {
                timestamp: ts.to_string(),
                ip: ip.to_string(),
            },
            _ => {
                tracing::warn!("Ignoring unrecognised cache content: {:?}", line);
                return None;
            }
        };
        Some(record)
    }
}

/// Storage for the last successfully applied IP.
pub trait CacheStore: Send + Sync {
    fn read(&self) -> Result<Option<CacheRecord>>;

    /// Replace the cached record.
    fn write(&self, record: &CacheRecord) -> Result<()>;
}

/// Cache backed by a single file, replaced atomically on write.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    /// Make sure the cache file exists and is writable.
    pub fn open(path: &Path) -> Result<Self> {
        touch(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

impl CacheStore for FileCache {
    fn read(&self) -> Result<Option<CacheRecord>> {
        // Undecodable bytes fall through to `parse`, which rejects them.
        match fs::read(&self.path) {
            Ok(bytes) => Ok(CacheRecord::parse(&String::from_utf8_lossy(&bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, record: &CacheRecord) -> Result<()> {
        let temp_path = self.temp_path();
        fs::write(&temp_path, record.render())?;
        fs::rename(&temp_path, &self.path)?;
        tracing::debug!("Cache written to {}", self.path.display());
        Ok(())
    }
}

/// Cache that remembers nothing.
#[derive(Debug, Default)]
pub struct NullCache;

impl CacheStore for NullCache {
    fn read(&self) -> Result<Option<CacheRecord>> {
        Ok(None)
    }

    fn write(&self, _record: &CacheRecord) -> Result<()> {
        Ok(())
    }
}

/// Create parent directories and the file itself if missing, without truncating it.
pub(crate) fn touch(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DdnsError::permission(path, &e))?;
    }
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| DdnsError::permission(path, &e))?;
    Ok(())
}
