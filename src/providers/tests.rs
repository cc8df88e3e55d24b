//! Provider tests with HTTP mocking.

mod godaddy_tests {
    use crate::error::DdnsError;
    use crate::providers::{Credentials, DnsProvider, GoDaddyProvider};
    use std::net::Ipv4Addr;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: String) -> GoDaddyProvider {
        GoDaddyProvider::with_base_url(
            Credentials {
                api_key: "api-key".to_string(),
                api_secret: "api-secret".to_string(),
            },
            600,
            base_url,
        )
    }

    #[tokio::test]
    async fn test_list_domains() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/domains"))
            .and(header("Authorization", "sso-key api-key:api-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"domain": "example.com", "status": "ACTIVE"},
                {"domain": "example.net", "status": "ACTIVE"},
                {"domain": "lapsed.org", "status": "CANCELLED"},
                {"domain": "old.io", "status": "EXPIRED"},
                {"domain": "nostatus.dev"}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let domains = provider(mock_server.uri()).list_domains().await.unwrap();

        assert_eq!(domains.len(), 2);
        assert!(domains.contains("example.com"));
        assert!(domains.contains("example.net"));
        assert!(!domains.contains("lapsed.org"));
    }

    #[tokio::test]
    async fn test_list_domains_bad_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/domains"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": "UNABLE_TO_AUTHENTICATE",
                "message": "Unauthorized : Could not authenticate API key/secret"
            })))
            .mount(&mock_server)
            .await;

        let err = provider(mock_server.uri())
            .list_domains()
            .await
            .unwrap_err();

        match err {
            DdnsError::Provider { provider, message } => {
                assert_eq!(provider, "godaddy");
                assert!(message.contains("Could not authenticate"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_puts_changed_records() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/domains/example.com/records/A/vpn"))
            .and(header("Authorization", "sso-key api-key:api-secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"data": "1.1.1.1", "name": "vpn"}])),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/v1/domains/example.com/records/A/vpn"))
            .and(body_json(serde_json::json!([{"data": "3.3.3.3", "ttl": 600}])))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let ip = Ipv4Addr::new(3, 3, 3, 3);
        let acknowledged = provider(mock_server.uri())
            .update_ip(ip, &["example.com".to_string()], "vpn")
            .await
            .unwrap();

        assert!(acknowledged);
    }

    #[tokio::test]
    async fn test_update_skips_current_records() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/domains/example.com/records/A/@"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"data": "3.3.3.3", "name": "@"}])),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let ip = Ipv4Addr::new(3, 3, 3, 3);
        let acknowledged = provider(mock_server.uri())
            .update_ip(ip, &["example.com".to_string()], "@")
            .await
            .unwrap();

        assert!(acknowledged);
    }

    #[tokio::test]
    async fn test_update_creates_missing_record() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/domains/example.net/records/A/home"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/v1/domains/example.net/records/A/home"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let acknowledged = provider(format!("{}/", mock_server.uri()))
            .update_ip(Ipv4Addr::new(3, 3, 3, 3), &["example.net".to_string()], "home")
            .await
            .unwrap();

        assert!(acknowledged);
    }

    #[tokio::test]
    async fn test_update_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "code": "INVALID_BODY",
                "message": "Request body doesn't fulfill schema"
            })))
            .mount(&mock_server)
            .await;

        let err = provider(mock_server.uri())
            .update_ip(Ipv4Addr::new(3, 3, 3, 3), &["example.com".to_string()], "@")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("doesn't fulfill schema"));
    }

    #[tokio::test]
    async fn test_update_error_without_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&mock_server)
            .await;

        let err = provider(mock_server.uri())
            .update_ip(Ipv4Addr::new(3, 3, 3, 3), &["example.com".to_string()], "@")
            .await
            .unwrap_err();

        assert_eq!(err.detail(), "HTTP 500 Internal Server Error");
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(provider("http://localhost".to_string()).name(), "godaddy");
    }
}

mod connector_tests {
    use crate::config::Config;
    use crate::providers::{Credentials, GoDaddyConnector, ProviderConnector};

    #[test]
    fn test_connector_builds_godaddy_client() {
        let provider = GoDaddyConnector.connect(
            Credentials {
                api_key: "k".to_string(),
                api_secret: "s".to_string(),
            },
            &Config::example(),
        );
        assert_eq!(provider.name(), "godaddy");
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let creds = Credentials {
            api_key: "k".to_string(),
            api_secret: "hunter2".to_string(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
