//! Outbound webhook dispatch -- LINE Notify for the primary channel,
//! a Slack incoming webhook for failure alerts.
//!
//! Both calls are one-shot with no retry. A non-2xx response is
//! accepted silently so a notification failure can never mask the
//! processing error that is being reported; only transport-level
//! failures propagate.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{Result, WatchError};

/// Delivers rendered messages and failure diagnostics.
#[async_trait]
pub trait Dispatcher {
    async fn send_primary(&self, text: &str) -> Result<(), WatchError>;
    async fn send_alert(&self, text: &str) -> Result<(), WatchError>;
}

/// `Dispatcher` backed by fixed webhook endpoints.
pub struct WebhookDispatcher {
    line_endpoint: String,
    line_token: String,
    slack_endpoint: String,
    alert_username: String,
    http_client: Client,
}

impl WebhookDispatcher {
    pub fn new(
        line_endpoint: impl Into<String>,
        line_token: impl Into<String>,
        slack_endpoint: impl Into<String>,
        alert_username: impl Into<String>,
    ) -> Self {
        Self {
            line_endpoint: line_endpoint.into(),
            line_token: line_token.into(),
            slack_endpoint: slack_endpoint.into(),
            alert_username: alert_username.into(),
            http_client: Client::new(),
        }
    }
}

#[async_trait]
impl Dispatcher for WebhookDispatcher {
    async fn send_primary(&self, text: &str) -> Result<(), WatchError> {
        let resp = self
            .http_client
            .post(&self.line_endpoint)
            .header("Authorization", format!("Bearer {}", self.line_token))
            .form(&[("message", text)])
            .send()
            .await?;

        if !resp.status().is_success() {
            eprintln!("Warning: primary notify returned HTTP {}", resp.status());
        }
        Ok(())
    }

    async fn send_alert(&self, text: &str) -> Result<(), WatchError> {
        let body = json!({
            "username": self.alert_username,
            "text": text,
        });

        let resp = self
            .http_client
            .post(&self.slack_endpoint)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            eprintln!("Warning: alert webhook returned HTTP {}", resp.status());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_primary_posts_form_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/notify")
            .match_header("authorization", "Bearer line-secret")
            .match_body(mockito::Matcher::UrlEncoded(
                "message".into(),
                "hello".into(),
            ))
            .with_status(200)
            .create_async()
            .await;

        let dispatcher = WebhookDispatcher::new(
            format!("{}/notify", server.url()),
            "line-secret",
            format!("{}/slack", server.url()),
            "watchdog",
        );
        dispatcher.send_primary("hello").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_alert_posts_slack_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/slack")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "username": "watchdog",
                "text": "boom",
            })))
            .with_status(200)
            .create_async()
            .await;

        let dispatcher = WebhookDispatcher::new(
            format!("{}/notify", server.url()),
            "line-secret",
            format!("{}/slack", server.url()),
            "watchdog",
        );
        dispatcher.send_alert("boom").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_2xx_is_accepted_silently() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/notify")
            .with_status(500)
            .create_async()
            .await;

        let dispatcher = WebhookDispatcher::new(
            format!("{}/notify", server.url()),
            "line-secret",
            format!("{}/slack", server.url()),
            "watchdog",
        );
        assert!(dispatcher.send_primary("hello").await.is_ok());
    }
}
