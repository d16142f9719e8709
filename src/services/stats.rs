//! Statistics service client
//!
//! Forwards endpoint hits to the external statistics service. Recording is
//! best-effort: failures are logged and never propagated to the caller.

use std::time::Duration;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::StatsConfig;
use crate::utils::errors::Result;
use crate::utils::helpers::{format_timestamp, truncate_to_seconds};

/// Hit payload accepted by the statistics service
#[derive(Debug, Clone, Serialize)]
pub struct EndpointHit {
    pub app: String,
    pub uri: String,
    pub ip: String,
    pub timestamp: String,
}

/// HTTP client for the statistics service
#[derive(Clone)]
pub struct StatsClient {
    client: reqwest::Client,
    endpoint: Option<String>,
    app_name: String,
}

impl StatsClient {
    /// Create a new StatsClient instance
    pub fn new(config: &StatsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            app_name: config.app_name.clone(),
        })
    }

    /// Whether hit recording is configured
    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Record a hit; a no-op without a configured endpoint
    pub async fn record_hit(&self, uri: &str, ip: &str) {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return;
        };

        let hit = EndpointHit {
            app: self.app_name.clone(),
            uri: uri.to_string(),
            ip: ip.to_string(),
            timestamp: format_timestamp(truncate_to_seconds(Utc::now())),
        };

        let url = format!("{}/hit", endpoint.trim_end_matches('/'));
        match self.client.post(&url).json(&hit).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(uri = uri, ip = ip, "Hit recorded");
            }
            Ok(response) => {
                warn!(uri = uri, status = %response.status(), "Stats service rejected hit");
            }
            Err(e) => {
                warn!(uri = uri, error = %e, "Failed to reach stats service");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatsConfig;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(endpoint: Option<String>) -> StatsConfig {
        StatsConfig {
            endpoint,
            app_name: "eventboard-main".to_string(),
            timeout_seconds: 2,
        }
    }

    #[tokio::test]
    async fn test_disabled_without_endpoint() {
        let client = StatsClient::new(&config(None)).unwrap();
        assert!(!client.is_enabled());
        // must not panic or hang
        client.record_hit("/events/1", "1.2.3.4").await;
    }

    #[tokio::test]
    async fn test_record_hit_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hit"))
            .and(body_partial_json(serde_json::json!({
                "app": "eventboard-main",
                "uri": "/events/1",
                "ip": "1.2.3.4"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = StatsClient::new(&config(Some(server.uri()))).unwrap();
        assert!(client.is_enabled());
        client.record_hit("/events/1", "1.2.3.4").await;
    }

    #[tokio::test]
    async fn test_record_hit_swallows_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hit"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = StatsClient::new(&config(Some(server.uri()))).unwrap();
        client.record_hit("/events/1", "1.2.3.4").await;
    }
}
