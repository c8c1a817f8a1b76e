//! Per-channel configuration.

use lettre::message::Mailbox;
use url::Url;

use super::{ConfigError, NotifyType, Section};

/// The single active channel.
///
/// Only the selected variant exists, so a notifier can never read the
/// settings of a channel that was not configured.
#[derive(Debug, Clone)]
pub enum ChannelConfig {
    Mail(MailConfig),
    Slack(SlackConfig),
    Webhook(WebhookConfig),
    WorkWeixin(WorkWeixinConfig),
}

impl ChannelConfig {
    pub(super) fn parse(notify_type: NotifyType, section: &Section<'_>) -> Result<Self, ConfigError> {
        match notify_type {
            NotifyType::Mail => MailConfig::parse(section).map(Self::Mail),
            NotifyType::Slack => SlackConfig::parse(section).map(Self::Slack),
            NotifyType::Webhook => WebhookConfig::parse(section).map(Self::Webhook),
            NotifyType::WorkWeixin => WorkWeixinConfig::parse(section).map(Self::WorkWeixin),
        }
    }

    pub fn notify_type(&self) -> NotifyType {
        match self {
            Self::Mail(_) => NotifyType::Mail,
            Self::Slack(_) => NotifyType::Slack,
            Self::Webhook(_) => NotifyType::Webhook,
            Self::WorkWeixin(_) => NotifyType::WorkWeixin,
        }
    }
}

fn http_url(section: &Section<'_>, key: &'static str) -> Result<String, ConfigError> {
    let raw = section.required(key)?;
    let url = Url::parse(raw).map_err(|e| ConfigError::invalid(key, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.to_string()),
        scheme => Err(ConfigError::invalid(
            key,
            format!("unsupported scheme {scheme:?}"),
        )),
    }
}

fn mailbox(key: &'static str, raw: &str) -> Result<Mailbox, ConfigError> {
    raw.parse()
        .map_err(|e| ConfigError::invalid(key, format!("{raw:?}: {e}")))
}

/// SMTP server and recipients.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    /// Sender; `mail.server.from` or the login user.
    pub from: Mailbox,
    pub recipients: Vec<Mailbox>,
}

impl MailConfig {
    fn parse(section: &Section<'_>) -> Result<Self, ConfigError> {
        let user = section.required("mail.server.user")?.to_string();
        let password = section.required("mail.server.password")?.to_string();
        let host = section.required("mail.server.host")?.to_string();

        let raw_port = section.required("mail.server.port")?;
        let port = raw_port
            .parse::<u16>()
            .ok()
            .filter(|port| *port > 0)
            .ok_or_else(|| {
                ConfigError::invalid("mail.server.port", format!("{raw_port:?} is not a valid port"))
            })?;

        let from = match section.get("mail.server.from") {
            Some(from) => mailbox("mail.server.from", from)?,
            None => mailbox("mail.server.user", &user)?,
        };

        let recipients = section
            .required_list("mail.user")?
            .iter()
            .map(|address| mailbox("mail.user", address))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            user,
            password,
            host,
            port,
            from,
            recipients,
        })
    }
}

/// Slack incoming webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackConfig {
    pub webhook_url: String,
    pub channel: String,
}

impl SlackConfig {
    fn parse(section: &Section<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            webhook_url: http_url(section, "slack.webhook_url")?,
            channel: section.required("slack.channel")?.to_string(),
        })
    }
}

/// Generic HTTP webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: String,
}

impl WebhookConfig {
    fn parse(section: &Section<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            url: http_url(section, "webhook_url")?,
        })
    }
}

/// WeCom (WeChat Work) group robot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkWeixinConfig {
    pub endpoint: String,
    /// User ids to mention; `@all` mentions everyone.
    pub mentioned_list: Vec<String>,
    /// Phone numbers to mention; omitted from the payload when empty.
    pub mentioned_mobile_list: Vec<String>,
}

impl WorkWeixinConfig {
    fn parse(section: &Section<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: http_url(section, "workweixin.endpoint")?,
            mentioned_list: section.required_list("workweixin.mentioned_list")?,
            mentioned_mobile_list: section.list("workweixin.mentioned_mobile_list"),
        })
    }
}
