//! Notification delivery.
//!
//! Every channel implements [`Notifier`]. Exactly one notifier is active per
//! process, built from the configured [`ChannelConfig`] by [`build_notifier`].
//!
//! # Example
//!
//! ```ignore
//! use supervisor_event_relay::{Config, build_notifier};
//!
//! let config = Config::load("/etc/supervisor-event-listener.ini")?;
//! let notifier = build_notifier(&config.channel, &config.transport)?;
//! notifier.send(&event).await?;
//! ```

pub mod channels;

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::config::{ChannelConfig, TransportConfig};
use crate::event::ProcessEvent;

pub use channels::{MailChannel, SlackChannel, WebhookChannel, WorkWeixinChannel};

/// A delivery channel.
///
/// `send` performs exactly one outbound call and reports its failure as is:
/// there is no retry, queueing or batching behind it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Get the channel type name.
    fn channel_type(&self) -> &'static str;

    /// Deliver one event.
    async fn send(&self, event: &ProcessEvent) -> Result<()>;

    /// Send a synthetic event to verify the channel configuration.
    async fn test(&self, hostname: &str) -> Result<()> {
        let event = ProcessEvent::test_event(hostname);
        self.send(&event).await
    }
}

/// Build the notifier for the configured channel.
pub fn build_notifier(
    channel: &ChannelConfig,
    transport: &TransportConfig,
) -> Result<Arc<dyn Notifier>> {
    let notifier: Arc<dyn Notifier> = match channel {
        ChannelConfig::Mail(config) => Arc::new(MailChannel::new(config.clone(), transport)?),
        ChannelConfig::Slack(config) => Arc::new(SlackChannel::new(config.clone(), transport)?),
        ChannelConfig::Webhook(config) => {
            Arc::new(WebhookChannel::new(config.clone(), transport)?)
        }
        ChannelConfig::WorkWeixin(config) => {
            Arc::new(WorkWeixinChannel::new(config.clone(), transport)?)
        }
    };
    Ok(notifier)
}
