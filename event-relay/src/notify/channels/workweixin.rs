//! WeCom (WeChat Work) group robot channel.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{TransportConfig, WorkWeixinConfig};
use crate::event::ProcessEvent;
use crate::notify::Notifier;
use crate::utils::http_client::{build_client, post_json};
use crate::{Error, Result};

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    msgtype: &'static str,
    text: Text<'a>,
}

#[derive(Debug, Serialize)]
struct Text<'a> {
    content: String,
    mentioned_list: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    mentioned_mobile_list: &'a [String],
}

fn is_empty(list: &&[String]) -> bool {
    list.is_empty()
}

/// WeCom notification channel.
pub struct WorkWeixinChannel {
    config: WorkWeixinConfig,
    client: Client,
}

impl WorkWeixinChannel {
    pub fn new(config: WorkWeixinConfig, transport: &TransportConfig) -> Result<Self> {
        Ok(Self {
            config,
            client: build_client(transport)?,
        })
    }

    fn build_payload(&self, event: &ProcessEvent) -> TextMessage<'_> {
        TextMessage {
            msgtype: "text",
            text: Text {
                content: event.to_string(),
                mentioned_list: &self.config.mentioned_list,
                mentioned_mobile_list: &self.config.mentioned_mobile_list,
            },
        }
    }
}

#[async_trait]
impl Notifier for WorkWeixinChannel {
    fn channel_type(&self) -> &'static str {
        "workweixin"
    }

    async fn send(&self, event: &ProcessEvent) -> Result<()> {
        let payload = self.build_payload(event);
        let response = post_json(&self.client, &self.config.endpoint, &payload).await?;

        // The robot API answers 200 on success; anything else, even another
        // 2xx, is reported with the status and body verbatim.
        if response.status != StatusCode::OK {
            warn!(
                status = response.status.as_u16(),
                body = %response.body,
                "WorkWeixin notification failed"
            );
            return Err(Error::http_status(
                self.channel_type(),
                response.status.as_u16(),
                response.body,
            ));
        }

        debug!("WorkWeixin notification sent: {}", event.kind);
        Ok(())
    }
}
