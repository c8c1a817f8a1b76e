//! Slack incoming webhook channel.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{SlackConfig, TransportConfig};
use crate::event::ProcessEvent;
use crate::notify::Notifier;
use crate::utils::http_client::{build_client, post_json};
use crate::{Error, Result};

/// Slack notification channel.
pub struct SlackChannel {
    config: SlackConfig,
    client: Client,
}

impl SlackChannel {
    pub fn new(config: SlackConfig, transport: &TransportConfig) -> Result<Self> {
        Ok(Self {
            config,
            client: build_client(transport)?,
        })
    }

    fn build_payload(&self, event: &ProcessEvent) -> serde_json::Value {
        json!({
            "channel": self.config.channel,
            "text": event.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for SlackChannel {
    fn channel_type(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, event: &ProcessEvent) -> Result<()> {
        let payload = self.build_payload(event);
        let response = post_json(&self.client, &self.config.webhook_url, &payload).await?;

        if !response.status.is_success() {
            warn!("Slack webhook failed: {} - {}", response.status, response.body);
            return Err(Error::http_status(
                self.channel_type(),
                response.status.as_u16(),
                response.body,
            ));
        }

        debug!("Slack notification sent: {}", event.kind);
        Ok(())
    }
}
