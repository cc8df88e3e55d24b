//! DNS provider capability.

mod godaddy;

pub use godaddy::GoDaddyProvider;

use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Account credentials for the provider API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Trait for DNS providers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &'static str;

    /// Domains registered to the account.
    async fn list_domains(&self) -> Result<BTreeSet<String>>;

    /// Point the A record `alias` of every domain in `domains` at `ip`.
    ///
    /// Returns whether the provider acknowledged the change.
    async fn update_ip(&self, ip: Ipv4Addr, domains: &[String], alias: &str) -> Result<bool>;
}

/// Builds a provider client once credentials have been validated.
pub trait ProviderConnector: Send + Sync {
    fn connect(&self, credentials: Credentials, config: &Config) -> Arc<dyn DnsProvider>;
}

/// Connects to the GoDaddy API named by the configuration.
#[derive(Debug, Default)]
pub struct GoDaddyConnector;

impl ProviderConnector for GoDaddyConnector {
    fn connect(&self, credentials: Credentials, config: &Config) -> Arc<dyn DnsProvider> {
        Arc::new(GoDaddyProvider::with_base_url(
            credentials,
            config.ttl,
            config.api_base_url().to_string(),
        ))
    }
}

#[cfg(test)]
mod tests;
