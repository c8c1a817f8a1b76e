//! Generic webhook notification channel.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{TransportConfig, WebhookConfig};
use crate::event::ProcessEvent;
use crate::notify::Notifier;
use crate::utils::http_client::{build_client, post_json};
use crate::{Error, Result};

/// Generic webhook notification channel.
pub struct WebhookChannel {
    config: WebhookConfig,
    client: Client,
}

impl WebhookChannel {
    pub fn new(config: WebhookConfig, transport: &TransportConfig) -> Result<Self> {
        Ok(Self {
            config,
            client: build_client(transport)?,
        })
    }

    /// Build the JSON payload.
    fn build_payload(&self, event: &ProcessEvent) -> serde_json::Value {
        json!({
            "event_type": event.kind,
            "title": event.title(),
            "message": event.to_string(),
            "timestamp": event.timestamp.to_rfc3339(),
            "data": event,
        })
    }
}

#[async_trait]
impl Notifier for WebhookChannel {
    fn channel_type(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, event: &ProcessEvent) -> Result<()> {
        let payload = self.build_payload(event);
        let response = post_json(&self.client, &self.config.url, &payload).await?;

        if !response.status.is_success() {
            warn!("Webhook failed: {} - {}", response.status, response.body);
            return Err(Error::http_status(
                self.channel_type(),
                response.status.as_u16(),
                response.body,
            ));
        }

        debug!("Webhook notification sent: {}", event.kind);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_payload() {
        let config = WebhookConfig {
            url: "https://example.com/webhook".to_string(),
        };
        let channel = WebhookChannel::new(config, &TransportConfig::default()).unwrap();
        let mut event = ProcessEvent::new("PROCESS_STATE_EXITED", "web-01").with_process("cat");
        event.pid = Some(2766);

        let payload = channel.build_payload(&event);
        assert_eq!(payload["event_type"], "PROCESS_STATE_EXITED");
        assert_eq!(payload["message"], event.to_string());
        assert_eq!(payload["data"]["process_name"], "cat");
        assert_eq!(payload["data"]["pid"], 2766);
        assert_eq!(payload["data"]["to_state"], "EXITED");
    }
}
