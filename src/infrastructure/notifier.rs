//! Change notifications
//!
//! Delivery is a webhook POST so any chat bridge or relay can consume
//! change summaries. An unconfigured notifier is a supported setup for
//! log-only operation: sends are skipped with a warning instead of
//! failing the cycle.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use super::config::NotifyConfig;

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// Notification delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("Notification request failed")]
    Network {
        #[source]
        source: reqwest::Error,
    },
}

/// What happened to a notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    Skipped,
}

/// Delivery channel for change summaries.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<NotifyOutcome, NotifyError>;
}

/// Posts `{subject, body}` as JSON to a configured endpoint.
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: Option<String>,
    token: Option<String>,
}

impl WebhookNotifier {
    pub fn new(config: &NotifyConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build notification client: {}", e))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<NotifyOutcome, NotifyError> {
        let Some(endpoint) = &self.endpoint else {
            warn!("No notification endpoint configured, dropping: {}", subject);
            return Ok(NotifyOutcome::Skipped);
        };

        let mut request = self
            .client
            .post(endpoint)
            .json(&json!({ "subject": subject, "body": body }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|source| NotifyError::Network { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                status: status.as_u16(),
            });
        }

        info!("✅ Notification delivered: {}", subject);
        Ok(NotifyOutcome::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_notifier_skips() {
        let notifier = WebhookNotifier::new(&NotifyConfig {
            endpoint: None,
            token: None,
        })
        .unwrap();

        let outcome = notifier.notify("subject", "body").await.unwrap();
        assert_eq!(outcome, NotifyOutcome::Skipped);
    }

    #[test]
    fn test_error_messages_name_the_failure() {
        let error = NotifyError::Status { status: 503 };
        assert!(error.to_string().contains("503"));
    }
}
