//! Error types for godaddy-ddns.

use std::path::Path;
use thiserror::Error;

/// Result type alias for godaddy-ddns.
pub type Result<T> = std::result::Result<T, DdnsError>;

/// DDNS error types.
#[derive(Error, Debug)]
pub enum DdnsError {
    /// Configuration error (malformed file, missing target domain, missing credentials).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Log or cache path is not writable.
    #[error("Insufficient permissions to write to '{path}': {message}")]
    Permission { path: String, message: String },

    /// Public IP resolution produced no address.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Provider-specific error.
    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failure categories a caller can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Permission,
    Connectivity,
    Provider,
    Internal,
}

impl DdnsError {
    pub(crate) fn permission(path: &Path, err: &std::io::Error) -> Self {
        DdnsError::Permission {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn godaddy(message: impl Into<String>) -> Self {
        DdnsError::Provider {
            provider: "godaddy".to_string(),
            message: message.into(),
        }
    }

    /// Category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DdnsError::Config(_) => ErrorKind::Configuration,
            DdnsError::Permission { .. } => ErrorKind::Permission,
            DdnsError::Connectivity(_) => ErrorKind::Connectivity,
            DdnsError::Provider { .. } => ErrorKind::Provider,
            DdnsError::Network(_) | DdnsError::Io(_) | DdnsError::Serialization(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Process exit code for this failure (errno values).
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Configuration => 22, // EINVAL
            ErrorKind::Permission => 13,    // EACCES
            ErrorKind::Connectivity => 101, // ENETUNREACH
            ErrorKind::Provider => 111,     // ECONNREFUSED
            ErrorKind::Internal => 1,
        }
    }

    /// Message without the category prefix, for run log lines.
    pub fn detail(&self) -> String {
        match self {
            DdnsError::Config(msg)
            | DdnsError::Connectivity(msg)
            | DdnsError::Network(msg)
            | DdnsError::Serialization(msg) => msg.clone(),
            DdnsError::Provider { message, .. } => message.clone(),
            DdnsError::Permission { path, .. } => path.clone(),
            DdnsError::Io(e) => e.to_string(),
        }
    }
}

impl From<reqwest::Error> for DdnsError {
    fn from(e: reqwest::Error) -> Self {
        DdnsError::Network(e.to_string())
    }
}

impl From<serde_yaml::Error> for DdnsError {
    fn from(e: serde_yaml::Error) -> Self {
        DdnsError::Config(e.to_string())
    }
}

impl From<toml::de::Error> for DdnsError {
    fn from(e: toml::de::Error) -> Self {
        DdnsError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for DdnsError {
    fn from(e: toml::ser::Error) -> Self {
        DdnsError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_kind() {
        assert_eq!(DdnsError::Config("x".into()).exit_code(), 22);
        assert_eq!(
            DdnsError::Permission {
                path: "/x".into(),
                message: "denied".into()
            }
            .exit_code(),
            13
        );
        assert_eq!(DdnsError::Connectivity("x".into()).exit_code(), 101);
        assert_eq!(DdnsError::godaddy("bad").exit_code(), 111);
        assert_eq!(DdnsError::Network("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_provider_display() {
        let err = DdnsError::godaddy("Unauthorized");
        assert_eq!(err.to_string(), "Provider error (godaddy): Unauthorized");
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert_eq!(err.detail(), "Unauthorized");
    }
}
