//! Notification channels.
//!
//! - Email (SMTP)
//! - Slack incoming webhooks
//! - Generic webhooks (HTTP POST)
//! - WeCom group robots

mod mail;
mod slack;
mod webhook;
mod workweixin;

pub use mail::MailChannel;
pub use slack::SlackChannel;
pub use webhook::WebhookChannel;
pub use workweixin::WorkWeixinChannel;
