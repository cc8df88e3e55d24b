//! Public IP detection.

use crate::error::{DdnsError, Result};
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Source of this host's public IPv4 address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// `Ok(None)` when no address could be determined.
    async fn resolve_ipv4(&self) -> Result<Option<Ipv4Addr>>;
}

/// IP detector querying plain-text echo services in order.
pub struct IpDetector {
    client: reqwest::Client,
    services: Vec<String>,
}

impl IpDetector {
    /// Create a new IP detector with the default service.
    pub fn new() -> Self {
        Self::with_services(vec!["https://v4.ident.me".to_string()])
    }

    /// Create a new IP detector with custom services.
    pub fn with_services(services: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { client, services }
    }

    /// Try a single IP detection service.
    async fn try_service(&self, url: &str) -> Result<Ipv4Addr> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DdnsError::Network(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let text = response.text().await?;
        let ip_str = text.trim();

        ip_str
            .parse()
            .map_err(|_| DdnsError::Network(format!("Invalid IPv4 response: {}", ip_str)))
    }
}

impl Default for IpDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IpResolver for IpDetector {
    async fn resolve_ipv4(&self) -> Result<Option<Ipv4Addr>> {
        for service in &self.services {
            match self.try_service(service).await {
                Ok(ip) => {
                    tracing::debug!("Detected IPv4 {} from {}", ip, service);
                    return Ok(Some(ip));
                }
                Err(e) => {
                    tracing::warn!("Service {} failed: {}", service, e);
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_default_services() {
        let detector = IpDetector::new();
        assert_eq!(detector.services, vec!["https://v4.ident.me".to_string()]);
    }

    #[tokio::test]
    async fn test_detects_trimmed_ipv4() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.7\n"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let detector = IpDetector::with_services(vec![format!("{}/", mock_server.uri())]);
        let ip = detector.resolve_ipv4().await.unwrap();

        assert_eq!(ip, Some(Ipv4Addr::new(203, 0, 113, 7)));
    }

    #[tokio::test]
    async fn test_falls_back_to_next_service() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v6"))
            .respond_with(ResponseTemplate::new(200).set_body_string("2001:db8::1"))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("198.51.100.4"))
            .mount(&mock_server)
            .await;

        let detector = IpDetector::with_services(vec![
            format!("{}/broken", mock_server.uri()),
            format!("{}/v6", mock_server.uri()),
            format!("{}/ok", mock_server.uri()),
        ]);

        let ip = detector.resolve_ipv4().await.unwrap();
        assert_eq!(ip, Some(Ipv4Addr::new(198, 51, 100, 4)));
    }

    #[tokio::test]
    async fn test_all_services_failing_yields_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not an ip"))
            .mount(&mock_server)
            .await;

        let detector = IpDetector::with_services(vec![mock_server.uri()]);
        assert_eq!(detector.resolve_ipv4().await.unwrap(), None);
    }
}
