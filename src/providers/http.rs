//! Shared reqwest transport for upstream providers
//!
//! One pooled client per provider, bounded by the configured timeout.
//! Timeouts surface as `ProviderError::Transport`.

use crate::error::ProviderError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("timeseries-acquisition/", env!("CARGO_PKG_VERSION"));

/// Longest error body we keep for diagnostics
const MAX_ERROR_BODY: usize = 512;

#[derive(Clone)]
pub struct UpstreamClient {
    provider: &'static str,
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(
        provider: &'static str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            provider,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `{base_url}{path}` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(provider = self.provider, url = %url, "Upstream request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!(provider = self.provider, error = %e, "Upstream request failed");
                ProviderError::Transport(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: self.provider,
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
            provider: self.provider,
            message: e.to_string(),
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_get_json_decodes_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ping").query_param("q", "x");
                then.status(200).json_body(json!({ "ok": true }));
            })
            .await;

        let client =
            UpstreamClient::new("test", &server.base_url(), Duration::from_secs(2)).unwrap();
        let body: Value = client.get_json("/ping", &[("q", "x".to_string())]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/broken");
                then.status(503).body("maintenance");
            })
            .await;

        let client =
            UpstreamClient::new("test", &server.base_url(), Duration::from_secs(2)).unwrap();
        let err = client.get_json::<Value>("/broken", &[]).await.unwrap_err();

        match err {
            ProviderError::Status { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/html");
                then.status(200).body("<html></html>");
            })
            .await;

        let client =
            UpstreamClient::new("test", &server.base_url(), Duration::from_secs(2)).unwrap();
        let err = client.get_json::<Value>("/html", &[]).await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode { provider: "test", .. }));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("台北氣溫", 2), "台北…");
        assert_eq!(truncate("abc", 5), "abc");
    }
}
