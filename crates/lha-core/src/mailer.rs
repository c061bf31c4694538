//! Outbound email transports.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::MailConfig;
use crate::error::{LhaError, LhaResult};

/// Postmark single-message endpoint.
pub const POSTMARK_URL: &str = "https://api.postmarkapp.com/email";

/// Content type of every message sent.
pub const CONTENT_TYPE: &str = "text/plain; charset=UTF-8";

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub reply_to: Option<String>,
}

/// Something that can deliver an [`EmailMessage`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> LhaResult<()>;
}

/// Pick the transport for a mail configuration: Postmark when a server
/// token is set, otherwise the log-only transport.
pub fn from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match config.postmark_token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => Arc::new(PostmarkMailer::new(token, &config.from)),
        None => {
            info!("No mail transport configured, notifications will only be logged");
            Arc::new(LogMailer)
        }
    }
}

/// Delivers mail through the Postmark HTTP API.
#[derive(Clone)]
pub struct PostmarkMailer {
    client: reqwest::Client,
    endpoint: String,
    server_token: String,
    from: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PostmarkPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text_body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

impl PostmarkMailer {
    pub fn new(server_token: &str, from: &str) -> Self {
        Self::with_endpoint(POSTMARK_URL, server_token, from)
    }

    pub fn with_endpoint(endpoint: &str, server_token: &str, from: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.to_string(),
            server_token: server_token.to_string(),
            from: from.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for PostmarkMailer {
    async fn send(&self, message: &EmailMessage) -> LhaResult<()> {
        let payload = PostmarkPayload {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text_body: &message.body,
            reply_to: message.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .header("X-Postmark-Server-Token", &self.server_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LhaError::Mail(format!("Postmark request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Postmark rejected message");
            return Err(LhaError::Mail(format!("Postmark returned {}: {}", status, text)));
        }

        debug!(to = %message.to, "Message accepted by Postmark");
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> LhaResult<()> {
        info!(
            to = %message.to,
            reply_to = message.reply_to.as_deref().unwrap_or(""),
            subject = %message.subject,
            content_type = CONTENT_TYPE,
            "Email (log transport)\n{}",
            message.body
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;
    use tokio::sync::Mutex;

    type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn fake_postmark(status: StatusCode) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route(
                "/email",
                post(
                    move |State(seen): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        let token = headers
                            .get("X-Postmark-Server-Token")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen.lock().await.push((token, body));
                        status
                    },
                ),
            )
            .with_state(captured.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/email", addr), captured)
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: "admin@example.com".to_string(),
            subject: "New LHA Rate Calculation - Jane".to_string(),
            body: "Name: Jane".to_string(),
            reply_to: Some("jane@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_postmark_payload() {
        let (url, captured) = fake_postmark(StatusCode::OK).await;
        let mailer = PostmarkMailer::with_endpoint(&url, "server-token", "calc@example.com");
        mailer.send(&message()).await.unwrap();

        let seen = captured.lock().await;
        assert_eq!(seen.len(), 1);
        let (token, body) = &seen[0];
        assert_eq!(token.as_deref(), Some("server-token"));
        assert_eq!(body["From"], "calc@example.com");
        assert_eq!(body["To"], "admin@example.com");
        assert_eq!(body["Subject"], "New LHA Rate Calculation - Jane");
        assert_eq!(body["TextBody"], "Name: Jane");
        assert_eq!(body["ReplyTo"], "jane@example.com");
    }

    #[tokio::test]
    async fn test_postmark_rejection_is_mail_error() {
        let (url, _captured) = fake_postmark(StatusCode::UNPROCESSABLE_ENTITY).await;
        let mailer = PostmarkMailer::with_endpoint(&url, "server-token", "calc@example.com");
        let err = mailer.send(&message()).await.unwrap_err();
        assert!(matches!(err, LhaError::Mail(_)));
        assert!(err.to_string().contains("422"));
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        assert!(LogMailer.send(&message()).await.is_ok());
    }
}
