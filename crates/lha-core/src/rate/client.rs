//! HTTP client for the `lha-rate` endpoint.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{LhaError, LhaResult};
use crate::sanitize::trim_words;

/// Words of the error body kept in an `Api` error.
const EXCERPT_WORDS: usize = 30;

/// Something that can look up an LHA rate.
#[async_trait]
pub trait RateLookup: Send + Sync {
    /// Fetch the rate for `postcode` and `bedrooms`, returning the decoded
    /// response body untouched.
    async fn fetch_rate(&self, api_key: &str, postcode: &str, bedrooms: u32) -> LhaResult<Value>;
}

/// Rate API client. One attempt per lookup, no retries.
#[derive(Clone)]
pub struct RateClient {
    base_url: String,
    client: reqwest::Client,
}

impl RateClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/lha-rate", self.base_url)
    }
}

#[async_trait]
impl RateLookup for RateClient {
    async fn fetch_rate(&self, api_key: &str, postcode: &str, bedrooms: u32) -> LhaResult<Value> {
        let bedrooms = bedrooms.to_string();
        debug!(postcode = %postcode, bedrooms = %bedrooms, "Requesting LHA rate");

        let response = self
            .client
            .get(self.endpoint())
            .query(&[("key", api_key), ("postcode", postcode), ("bedrooms", bedrooms.as_str())])
            .send()
            .await
            .map_err(|e| {
                // The URL carries the API key, keep it out of logs and messages.
                let e = e.without_url();
                warn!(error = %e, postcode = %postcode, "Rate API request failed");
                LhaError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LhaError::Network(e.without_url().to_string()))?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), postcode = %postcode, "Rate API returned an error");
            return Err(LhaError::Api {
                status: status.as_u16(),
                excerpt: trim_words(&body, EXCERPT_WORDS),
            });
        }

        let json: Value = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Rate API returned invalid JSON");
            LhaError::Parse(e)
        })?;

        debug!(postcode = %postcode, "LHA rate received");
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode as AxumStatus;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;

    /// Serve a fake rate API on an ephemeral port and return its base URL.
    async fn fake_api() -> String {
        async fn lha_rate(Query(q): Query<HashMap<String, String>>) -> axum::response::Response {
            let postcode = q.get("postcode").cloned().unwrap_or_default();
            match postcode.as_str() {
                "W14 9JH" => axum::Json(serde_json::json!({
                    "status": "success",
                    "echo": { "key": q.get("key"), "bedrooms": q.get("bedrooms") },
                    "data": { "brma": "Central London", "rate": "350.00" }
                }))
                .into_response(),
                "BOOM" => (AxumStatus::INTERNAL_SERVER_ERROR, "<h1>Server   error</h1>").into_response(),
                "TEAPOT" => (AxumStatus::IM_A_TEAPOT, "short and stout").into_response(),
                "SLOW" => {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    "{}".into_response()
                }
                _ => "<html>not json</html>".into_response(),
            }
        }

        let app = Router::new().route("/lha-rate", get(lha_rate));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str) -> RateClient {
        RateClient::new(base_url, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_success_returns_body_and_encodes_query() {
        let base = fake_api().await;
        let json = client(&base).fetch_rate("k&y", "W14 9JH", 2).await.unwrap();
        assert_eq!(json["data"]["brma"], "Central London");
        assert_eq!(json["data"]["rate"], "350.00");
        assert_eq!(json["echo"]["key"], "k&y");
        assert_eq!(json["echo"]["bedrooms"], "2");
    }

    #[tokio::test]
    async fn test_non_200_is_api_error_with_excerpt() {
        let base = fake_api().await;
        let err = client(&base).fetch_rate("key", "BOOM", 2).await.unwrap_err();
        match &err {
            LhaError::Api { status, excerpt } => {
                assert_eq!(*status, 500);
                assert_eq!(excerpt, "Server error");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
        assert!(err.to_string().contains("500"));

        let err = client(&base).fetch_rate("key", "TEAPOT", 2).await.unwrap_err();
        assert!(matches!(err, LhaError::Api { status: 418, .. }));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let base = fake_api().await;
        let err = client(&base).fetch_rate("key", "SW1A 1AA", 1).await.unwrap_err();
        assert!(matches!(err, LhaError::Parse(_)));
        assert_eq!(err.to_string(), "Invalid JSON from API.");
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let base = fake_api().await;
        let slow = RateClient::new(&base, Duration::from_millis(200));
        let err = slow.fetch_rate("key", "SLOW", 1).await.unwrap_err();
        assert!(matches!(err, LhaError::Network(_)));
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}", addr))
            .fetch_rate("key", "W14 9JH", 2)
            .await
            .unwrap_err();
        assert!(matches!(err, LhaError::Network(_)));
        assert!(!err.to_string().is_empty());
    }
}
