//! Configuration management for godaddy-ddns.

use crate::error::{DdnsError, Result};
use crate::providers::Credentials;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// GoDaddy's production API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.godaddy.com";

/// Alias GoDaddy uses for "no subdomain".
pub const ROOT_ALIAS: &str = "@";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Run log file; logging to file is disabled when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// IP cache file; every run is treated as a new IP when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,

    /// API key (or environment variable name if prefixed with $).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API secret (or environment variable name if prefixed with $).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,

    /// Override of the GoDaddy API endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// IP detection services to use, in order.
    #[serde(default = "default_ip_services")]
    pub ip_services: Vec<String>,

    /// TTL in seconds for updated records (default: 600).
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Domains and aliases to keep pointed at this host.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

fn default_ip_services() -> Vec<String> {
    vec!["https://v4.ident.me".to_string()]
}

fn default_ttl() -> u32 {
    600
}

/// One domain set + alias pairing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Domain name(s). Optional here so a missing value is reported when the target is processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainSpec>,

    /// Subdomain label, `@` for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// A single domain or a list of domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainSpec {
    One(String),
    Many(Vec<String>),
}

impl DomainSpec {
    /// Normalize to a set of unique domain names.
    pub fn to_set(&self) -> BTreeSet<String> {
        match self {
            DomainSpec::One(domain) => BTreeSet::from([domain.clone()]),
            DomainSpec::Many(domains) => domains.iter().cloned().collect(),
        }
    }
}

impl TargetConfig {
    /// The configured alias, or the root alias.
    pub fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(ROOT_ALIAS)
    }
}

impl Config {
    /// Candidate config file locations, most specific first.
    pub fn search_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("godaddy-ddns").join("config.yaml")),
            Some(PathBuf::from("/etc/godaddy-ddns/config.yaml")),
            Some(PathBuf::from("config.yaml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Get the default config file path: the first existing candidate.
    pub fn default_path() -> PathBuf {
        Self::search_paths()
            .into_iter()
            .find(|p| p.exists())
            .unwrap_or_else(|| PathBuf::from("/etc/godaddy-ddns/config.yaml"))
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DdnsError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;

        let parsed = if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml(&content)
        } else {
            Self::from_yaml(&content)
        };

        parsed.map_err(|e| {
            DdnsError::Config(format!(
                "Malformed configuration file '{}': {}",
                path.display(),
                e.detail()
            ))
        })
    }

    /// Parse YAML configuration.
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document is an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::from_defaults());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse TOML configuration.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn from_defaults() -> Self {
        Self {
            ip_services: default_ip_services(),
            ttl: default_ttl(),
            ..Self::default()
        }
    }

    /// The API endpoint to talk to.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Resolved credentials; both values must be present and non-empty.
    pub fn credentials(&self) -> Result<Credentials> {
        let key = self.api_key.as_deref().map(resolve_env).unwrap_or_default();
        let secret = self.api_secret.as_deref().map(resolve_env).unwrap_or_default();

        if key.is_empty() || secret.is_empty() {
            return Err(DdnsError::Config(
                "Missing API credentials (api_key and api_secret are required)".to_string(),
            ));
        }

        Ok(Credentials {
            api_key: key,
            api_secret: secret,
        })
    }

    /// Serialize as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| DdnsError::Serialization(e.to_string()))
    }

    /// Serialize as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Generate example configuration.
    pub fn example() -> Self {
        Self {
            log_path: Some(PathBuf::from("/var/log/godaddy-ddns/godaddy-ddns.log")),
            cache_path: Some(PathBuf::from("/var/cache/godaddy-ddns/ip.cache")),
            api_key: Some("$GODADDY_API_KEY".to_string()),
            api_secret: Some("$GODADDY_API_SECRET".to_string()),
            api_base_url: None,
            ip_services: default_ip_services(),
            ttl: default_ttl(),
            targets: vec![
                TargetConfig {
                    domain: Some(DomainSpec::One("example.com".to_string())),
                    alias: None,
                },
                TargetConfig {
                    domain: Some(DomainSpec::Many(vec![
                        "example.com".to_string(),
                        "example.net".to_string(),
                    ])),
                    alias: Some("vpn".to_string()),
                },
            ],
        }
    }
}

/// Resolve environment variable references (values starting with $).
pub(crate) fn resolve_env(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_else(|_| {
            tracing::warn!("Environment variable {} not set", var_name);
            value.to_string()
        })
    } else {
        value.to_string()
    }
}
