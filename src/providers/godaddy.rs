//! GoDaddy DNS provider.

use super::{Credentials, DnsProvider};
use crate::config::DEFAULT_API_BASE_URL;
use crate::error::{DdnsError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::time::Duration;

/// GoDaddy DNS provider.
pub struct GoDaddyProvider {
    client: reqwest::Client,
    credentials: Credentials,
    ttl: u32,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct DomainSummary {
    domain: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct DnsRecord {
    data: String,
}

#[derive(Debug, Serialize)]
struct UpdateRecord {
    data: String,
    ttl: u32,
}

#[derive(Debug, Deserialize)]
struct GoDaddyError {
    message: String,
}

impl GoDaddyProvider {
    /// Create a new GoDaddy provider.
    pub fn new(credentials: Credentials, ttl: u32) -> Self {
        Self::with_base_url(credentials, ttl, DEFAULT_API_BASE_URL.to_string())
    }

    /// Create with custom base URL (OTE environment, testing).
    pub fn with_base_url(credentials: Credentials, ttl: u32, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            credentials,
            ttl,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!(
            "sso-key {}:{}",
            self.credentials.api_key, self.credentials.api_secret
        )
    }

    fn records_url(&self, domain: &str, alias: &str) -> String {
        format!("{}/v1/domains/{}/records/A/{}", self.base_url, domain, alias)
    }

    /// Send a request, turning transport failures and non-2xx answers into provider errors.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| DdnsError::godaddy(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error: std::result::Result<GoDaddyError, _> = response.json().await;
        let msg = error
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("HTTP {}", status));

        Err(DdnsError::godaddy(msg))
    }

    async fn current_records(&self, domain: &str, alias: &str) -> Result<Vec<DnsRecord>> {
        let response = self
            .send(self.client.get(self.records_url(domain, alias)))
            .await?;

        response
            .json()
            .await
            .map_err(|e| DdnsError::godaddy(format!("Unreadable records for {}: {}", domain, e)))
    }
}

#[async_trait]
impl DnsProvider for GoDaddyProvider {
    fn name(&self) -> &'static str {
        "godaddy"
    }

    async fn list_domains(&self) -> Result<BTreeSet<String>> {
        let url = format!("{}/v1/domains", self.base_url);
        let response = self.send(self.client.get(&url)).await?;

        let domains: Vec<DomainSummary> = response
            .json()
            .await
            .map_err(|e| DdnsError::godaddy(format!("Unreadable domain list: {}", e)))?;

        // Expired, cancelled or transferred-out domains cannot take record updates.
        Ok(domains
            .into_iter()
            .filter(|d| d.status == "ACTIVE")
            .map(|d| d.domain)
            .collect())
    }

    async fn update_ip(&self, ip: Ipv4Addr, domains: &[String], alias: &str) -> Result<bool> {
        let data = ip.to_string();

        for domain in domains {
            let records = self.current_records(domain, alias).await?;
            if !records.is_empty() && records.iter().all(|r| r.data == data) {
                tracing::debug!("{}.{} already points at {}", alias, domain, data);
                continue;
            }

            let body = vec![UpdateRecord {
                data: data.clone(),
                ttl: self.ttl,
            }];

            self.send(
                self.client
                    .put(self.records_url(domain, alias))
                    .header("Content-Type", "application/json")
                    .json(&body),
            )
            .await?;

            tracing::debug!("Set {}.{} to {}", alias, domain, data);
        }

        Ok(true)
    }
}
