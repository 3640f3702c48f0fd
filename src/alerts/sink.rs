//! Webhook alert delivery

use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a single delivery attempt. There is no retry state; at most
/// one attempt is made per triggering measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    Delivered,
    Failed(String),
}

/// Best-effort alert delivery.
///
/// The signature returns a status rather than an error, so a transport
/// outage can never abort the probe that triggered the alert.
#[async_trait]
pub trait AlertSink: Send {
    async fn send(&self, message: &str) -> DeliveryResult;
}

/// Posts alerts to a single configured webhook endpoint as `{"text": ...}`.
///
/// The alert is always logged locally first; visibility never depends on
/// the network.
pub struct WebhookSink {
    client: reqwest::Client,
    url: Option<String>,
}

impl WebhookSink {
    pub fn new(url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl AlertSink for WebhookSink {
    async fn send(&self, message: &str) -> DeliveryResult {
        tracing::warn!(alert = %message, "alert triggered");

        let url = match &self.url {
            Some(url) => url,
            None => {
                return DeliveryResult::Failed("no webhook endpoint configured".to_string());
            }
        };

        let payload = serde_json::json!({
            "text": format!(
                "DB performance alert\ntime: {}\n{}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                message
            ),
        });

        let response = match self
            .client
            .post(url)
            .timeout(DELIVERY_TIMEOUT)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "webhook request failed");
                return DeliveryResult::Failed(e.to_string());
            }
        };

        if response.status().is_success() {
            tracing::debug!(url = %url, "alert delivered");
            DeliveryResult::Delivered
        } else {
            let reason = format!("webhook returned status {}", response.status());
            tracing::error!(%reason, "webhook rejected alert");
            DeliveryResult::Failed(reason)
        }
    }
}
