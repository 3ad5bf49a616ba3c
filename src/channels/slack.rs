//! Slack channel — posts messages to an incoming webhook.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::channels::Notifier;
use crate::error::DeliveryError;

/// Appended on its own line after every message.
pub const MESSAGE_SEPARATOR: &str = "--------------------------";

/// Slack incoming-webhook notifier.
pub struct SlackWebhook {
    webhook_url: SecretString,
    client: reqwest::Client,
}

impl SlackWebhook {
    pub fn new(webhook_url: SecretString, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::RequestFailed(e.to_string()))?;
        Ok(Self {
            webhook_url,
            client,
        })
    }
}

/// JSON body for one message, separator included.
pub fn payload(message: &str) -> serde_json::Value {
    serde_json::json!({
        "text": format!("{message}\n{MESSAGE_SEPARATOR}"),
    })
}

#[async_trait]
impl Notifier for SlackWebhook {
    fn name(&self) -> &str {
        "slack"
    }

    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        let resp = self
            .client
            .post(self.webhook_url.expose_secret())
            .json(&payload(message))
            .send()
            .await
            // The URL is the credential; keep it out of the error text.
            .map_err(|e| DeliveryError::RequestFailed(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(chars = message.chars().count(), "Slack message delivered");
        Ok(())
    }
}
