//! Relay configuration.
//!
//! The configuration is an INI file whose keys live in the `[default]`
//! section. It is loaded once at startup and never changes afterwards.
//! Exactly one channel is configured, selected by `notify_type`.
//!
//! ```ini
//! [default]
//! notify_type = workweixin
//! watch_events = PROCESS_STATE_EXITED,PROCESS_STATE_FATAL
//! workweixin.endpoint = https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=...
//! workweixin.mentioned_list = alice,bob
//! ```

mod channel;

pub use channel::{ChannelConfig, MailConfig, SlackConfig, WebhookConfig, WorkWeixinConfig};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, ParseOption, Properties};
use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Values are taken as written: backslashes in passwords and URLs are not
/// escape sequences.
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        ..Default::default()
    }
}

/// Config file used when `-c` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/supervisor-event-listener.ini";

/// Every watched event kind must start with this prefix.
pub const WATCH_EVENT_PREFIX: &str = "PROCESS_STATE_";

/// Watched when `watch_events` yields no usable entry.
pub const DEFAULT_WATCH_EVENT: &str = "PROCESS_STATE_EXITED";

/// Outbound call timeout when `timeout` is not configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const SECTION: &str = "default";

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file path is empty")]
    EmptyPath,

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] ini::ParseError),

    #[error("unsupported notify_type {0:?}, expected one of mail, slack, webhook, workweixin")]
    UnsupportedNotifyType(String),

    #[error("missing required key `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Supported notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum NotifyType {
    Mail,
    Slack,
    Webhook,
    WorkWeixin,
}

/// Event kinds that trigger a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSet(BTreeSet<String>);

impl WatchSet {
    /// Parse a comma separated list of event kinds.
    ///
    /// Entries without the `PROCESS_STATE_` prefix are dropped. When nothing
    /// survives the filter the set falls back to `PROCESS_STATE_EXITED`.
    pub fn parse(raw: &str) -> Self {
        let events: BTreeSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|event| event.starts_with(WATCH_EVENT_PREFIX))
            .map(str::to_string)
            .collect();

        if events.is_empty() {
            Self::default()
        } else {
            Self(events)
        }
    }

    /// Exact membership test.
    pub fn contains(&self, kind: &str) -> bool {
        self.0.contains(kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for WatchSet {
    fn default() -> Self {
        Self(BTreeSet::from([DEFAULT_WATCH_EVENT.to_string()]))
    }
}

/// Proxy behaviour for HTTP channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProxyMode {
    /// Connect directly, ignoring proxy environment variables.
    #[default]
    Disabled,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY`.
    System,
    /// Route every request through this proxy URL.
    Explicit(String),
}

impl FromStr for ProxyMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" | "off" => Ok(Self::Disabled),
            "system" => Ok(Self::System),
            url => {
                reqwest::Proxy::all(url).map_err(|e| ConfigError::invalid("proxy", e.to_string()))?;
                Ok(Self::Explicit(url.to_string()))
            }
        }
    }
}

/// Settings shared by every outbound transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Upper bound for a single delivery attempt.
    pub timeout: Duration,
    pub proxy: ProxyMode,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            proxy: ProxyMode::Disabled,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive; `RUST_LOG` takes precedence.
    pub level: Option<String>,
    /// Directory for daily rolling log files.
    pub dir: Option<PathBuf>,
}

/// Fully validated relay configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub watch_events: WatchSet,
    pub channel: ChannelConfig,
    pub transport: TransportConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath);
        }

        let ini = Ini::load_from_file_opt(path, parse_option()).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Parse and validate configuration text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str_opt(text, parse_option())?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let section = Section::new(
            ini.section(Some(SECTION))
                .unwrap_or_else(|| ini.general_section()),
        );

        let raw_type = section.get("notify_type").unwrap_or_default();
        let notify_type = NotifyType::from_str(raw_type)
            .map_err(|_| ConfigError::UnsupportedNotifyType(raw_type.to_string()))?;

        let watch_events = section
            .get("watch_events")
            .map(WatchSet::parse)
            .unwrap_or_default();

        let transport = TransportConfig {
            timeout: section.timeout("timeout")?,
            proxy: section.get("proxy").unwrap_or_default().parse()?,
        };

        let logging = LoggingConfig {
            level: section.get("log_level").map(str::to_string),
            dir: section.get("log_dir").map(PathBuf::from),
        };

        let channel = ChannelConfig::parse(notify_type, &section)?;

        Ok(Self {
            watch_events,
            channel,
            transport,
            logging,
        })
    }

    pub fn notify_type(&self) -> NotifyType {
        self.channel.notify_type()
    }
}

/// Read access to the active section with trimmed values.
///
/// Empty values are treated as absent.
pub(crate) struct Section<'a> {
    props: &'a Properties,
}

impl<'a> Section<'a> {
    fn new(props: &'a Properties) -> Self {
        Self { props }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a str> {
        self.props
            .get(key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub(crate) fn required(&self, key: &'static str) -> Result<&'a str, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    /// A required comma separated list with at least one non-empty entry.
    pub(crate) fn required_list(&self, key: &'static str) -> Result<Vec<String>, ConfigError> {
        let list = self.list(key);
        if list.is_empty() {
            return Err(ConfigError::Missing(key));
        }
        Ok(list)
    }

    pub(crate) fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn timeout(&self, key: &'static str) -> Result<Duration, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        };
        match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::invalid(key, format!("{raw:?} is not a positive number of seconds"))),
        }
    }
}
