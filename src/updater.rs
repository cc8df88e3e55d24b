//! The reconciliation pass.
//!
//! One call to [`Updater::reconcile`] resolves the public IPv4 address,
//! compares it with the cached value and, when it changed (or the update is
//! forced), points every configured target at it. Targets are processed in
//! configuration order; the first provider failure aborts the pass and leaves
//! the cache untouched.

use crate::cache::{CacheRecord, CacheStore, FileCache, NullCache};
use crate::config::Config;
use crate::detector::IpResolver;
use crate::error::{DdnsError, Result};
use crate::journal::{FileLog, Journal, LogSink, NullLog};
use crate::providers::{DnsProvider, ProviderConnector};
use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Result of a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The cached IP matched; nothing was sent to the provider.
    UpToDate { ip: Ipv4Addr },

    /// Targets were pushed to the provider and the cache rewritten.
    Updated {
        ip: Ipv4Addr,
        /// `"{alias}.{domains}"` for each target that was updated, in order.
        targets: Vec<String>,
        /// Configured domains the account does not hold.
        unknown_domains: BTreeSet<String>,
    },
}

impl Outcome {
    pub fn ip(&self) -> Ipv4Addr {
        match self {
            Outcome::UpToDate { ip } | Outcome::Updated { ip, .. } => *ip,
        }
    }
}

/// Runs reconciliation passes against injected collaborators.
pub struct Updater {
    resolver: Arc<dyn IpResolver>,
    connector: Arc<dyn ProviderConnector>,
    echo: Option<Arc<dyn LogSink>>,
}

impl Updater {
    pub fn new(resolver: Arc<dyn IpResolver>, connector: Arc<dyn ProviderConnector>) -> Self {
        Self {
            resolver,
            connector,
            echo: None,
        }
    }

    /// Mirror every run log entry to `echo` (typically the console).
    pub fn with_echo(mut self, echo: Arc<dyn LogSink>) -> Self {
        self.echo = Some(echo);
        self
    }

    /// Perform one reconciliation pass.
    pub async fn reconcile(&self, config: &Config, force: bool) -> Result<Outcome> {
        let journal = self.open_journal(config)?;
        let cache = open_cache(config, &journal)?;

        let credentials = config
            .credentials()
            .map_err(|e| abort(&journal, &e.detail(), e))?;

        let ip = match self.resolver.resolve_ipv4().await {
            Ok(Some(ip)) => ip,
            Ok(None) => {
                let err = DdnsError::Connectivity("Failed to determine IPv4 address".to_string());
                return Err(abort(&journal, &err.detail(), err));
            }
            Err(e) => {
                let err = DdnsError::Connectivity(format!(
                    "Failed to determine IPv4 address ({})",
                    e.detail()
                ));
                return Err(abort(&journal, &err.detail(), err));
            }
        };

        let cached = cache.read().map_err(|e| {
            let msg = format!("Unable to read cache ({})", e.detail());
            abort(&journal, &msg, e)
        })?;
        let cached_ip = cached.as_ref().map(|record| record.ip.as_str());

        if force {
            journal.info("Performing forced update");
        } else if cached_ip == Some(ip.to_string().as_str()) {
            journal.success(&format!("IP address is already up-to-date ({})", ip));
            return Ok(Outcome::UpToDate { ip });
        } else {
            journal.info(&format!("New IP address detected ({})", ip));
        }

        let provider = self.connector.connect(credentials, config);
        let available = provider
            .list_domains()
            .await
            .map_err(|e| bad_response(&journal, e))?;
        tracing::debug!("Account holds {} domain(s)", available.len());

        let (targets, unknown_domains) =
            update_targets(provider.as_ref(), config, ip, &available, &journal).await?;

        if !unknown_domains.is_empty() {
            journal.warning(&format!(
                "The following domains were not found {}",
                braced(&unknown_domains)
            ));
        }

        cache.write(&CacheRecord::new(ip.to_string())).map_err(|e| {
            let msg = format!("Unable to write cache ({})", e.detail());
            abort(&journal, &msg, e)
        })?;

        journal.success(&format!("Updated {} target(s) to {}", targets.len(), ip));

        Ok(Outcome::Updated {
            ip,
            targets,
            unknown_domains,
        })
    }

    fn open_journal(&self, config: &Config) -> Result<Journal> {
        let file: Box<dyn LogSink> = match &config.log_path {
            Some(path) => match FileLog::open(path) {
                Ok(log) => Box::new(log),
                Err(e) => {
                    // The log file itself is unusable, so only the echo hears about it.
                    let journal = Journal::new(Box::new(NullLog)).with_echo(self.echo.clone());
                    let msg = format!(
                        "Insufficient permissions to write log to '{}'.",
                        path.display()
                    );
                    return Err(abort(&journal, &msg, e));
                }
            },
            None => Box::new(NullLog),
        };

        Ok(Journal::new(file).with_echo(self.echo.clone()))
    }
}

fn open_cache(config: &Config, journal: &Journal) -> Result<Box<dyn CacheStore>> {
    match &config.cache_path {
        Some(path) => match FileCache::open(path) {
            Ok(cache) => Ok(Box::new(cache)),
            Err(e) => {
                let msg = format!(
                    "Insufficient permissions to write to cache ({}).",
                    path.display()
                );
                Err(abort(journal, &msg, e))
            }
        },
        None => {
            journal.warning(
                "No cache file specified, so the IP address will always be submitted as if new - this could be considered abusive!",
            );
            Ok(Box::new(NullCache))
        }
    }
}

/// Push `ip` to every target, stopping at the first failure.
async fn update_targets(
    provider: &dyn DnsProvider,
    config: &Config,
    ip: Ipv4Addr,
    available: &BTreeSet<String>,
    journal: &Journal,
) -> Result<(Vec<String>, BTreeSet<String>)> {
    let mut succeeded = Vec::new();
    let mut unknown = BTreeSet::new();

    for target in &config.targets {
        let Some(spec) = &target.domain else {
            let err = DdnsError::Config("Missing 'domain' in configuration file".to_string());
            return Err(abort(journal, &err.detail(), err));
        };

        let wanted = spec.to_set();
        unknown.extend(wanted.difference(available).cloned());

        let known: Vec<String> = wanted.intersection(available).cloned().collect();
        let alias = target.alias();
        if known.is_empty() {
            journal.info(&format!(
                "Skipping alias '{}': none of {} are on the account",
                alias,
                braced(&wanted)
            ));
            continue;
        }

        let descriptor = describe(alias, &known);
        match provider.update_ip(ip, &known, alias).await {
            Ok(true) => {
                journal.success(&format!("Updated IP for {}", descriptor));
                succeeded.push(descriptor);
            }
            Ok(false) => {
                let msg = format!(
                    "Unknown failure for (domain(s): {}, alias: {})",
                    braced(&wanted),
                    alias
                );
                return Err(abort(journal, &msg, DdnsError::godaddy(msg.clone())));
            }
            Err(e) => return Err(bad_response(journal, e)),
        }
    }

    Ok((succeeded, unknown))
}

/// Log a fatal condition and hand back the error to surface.
fn abort(journal: &Journal, message: &str, err: DdnsError) -> DdnsError {
    journal.error(message);
    err
}

/// Any failure while talking to the provider is a provider error.
fn bad_response(journal: &Journal, err: DdnsError) -> DdnsError {
    let err = match err {
        DdnsError::Provider { .. } => err,
        other => DdnsError::godaddy(other.detail()),
    };
    let msg = format!("Bad response from GoDaddy ({})", err.detail());
    abort(journal, &msg, err)
}

/// `"{alias}.{d1, d2}"`.
pub fn describe(alias: &str, domains: &[String]) -> String {
    format!("{}.{{{}}}", alias, domains.join(", "))
}

fn braced(domains: &BTreeSet<String>) -> String {
    let names: Vec<&str> = domains.iter().map(String::as_str).collect();
    format!("{{{}}}", names.join(", "))
}
