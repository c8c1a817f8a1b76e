//! Process events.
//!
//! A [`ProcessEvent`] is built from one decoded supervisord notification,
//! consumed by the dispatcher and then dropped.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;
use strum::{Display, EnumString, IntoStaticStr};
use supervisor_proto::Notification;

use crate::config::WATCH_EVENT_PREFIX;

/// Payload keys lifted into dedicated fields.
const LIFTED_KEYS: &[&str] = &["processname", "groupname", "from_state", "pid", "expected"];

/// Supervisord process states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    Stopped,
    Starting,
    Running,
    Backoff,
    Stopping,
    Exited,
    Fatal,
    Unknown,
}

impl ProcessState {
    /// State a `PROCESS_STATE_*` event kind transitions into.
    pub fn from_event_kind(kind: &str) -> Option<Self> {
        kind.strip_prefix(WATCH_EVENT_PREFIX)?.parse().ok()
    }
}

/// One observed process lifecycle transition.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessEvent {
    /// Event name, e.g. `PROCESS_STATE_EXITED`.
    pub kind: String,
    pub process_name: Option<String>,
    pub group_name: Option<String>,
    pub from_state: Option<ProcessState>,
    pub to_state: Option<ProcessState>,
    pub pid: Option<u32>,
    /// Whether the exit code was one of the configured expected codes.
    pub expected: Option<bool>,
    pub hostname: String,
    pub serial: u64,
    pub timestamp: DateTime<Local>,
    /// Remaining payload fields.
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ProcessEvent {
    pub fn new(kind: impl Into<String>, hostname: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            to_state: ProcessState::from_event_kind(&kind),
            kind,
            process_name: None,
            group_name: None,
            from_state: None,
            pid: None,
            expected: None,
            hostname: hostname.into(),
            serial: 0,
            timestamp: Local::now(),
            attributes: BTreeMap::new(),
            data: None,
        }
    }

    pub fn with_process(mut self, name: impl Into<String>) -> Self {
        self.process_name = Some(name.into());
        self
    }

    /// Build an event from a decoded notification.
    ///
    /// Payload values that fail to parse are kept in `attributes` instead of
    /// being dropped.
    pub fn from_notification(notification: &Notification, hostname: &str) -> Self {
        let payload = &notification.payload;
        let mut event = Self::new(notification.event_name(), hostname);

        event.serial = notification.header.serial;
        event.process_name = payload.get("processname").map(str::to_string);
        event.group_name = payload.get("groupname").map(str::to_string);
        event.from_state = payload.get("from_state").and_then(|s| s.parse().ok());
        event.pid = payload.get("pid").and_then(|pid| pid.parse().ok());
        event.expected = payload.get("expected").and_then(|e| match e {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        });
        event.data = payload.data.clone();

        for (key, value) in &payload.fields {
            let lifted = LIFTED_KEYS.contains(&key.as_str());
            let parsed = match key.as_str() {
                "from_state" => event.from_state.is_some(),
                "pid" => event.pid.is_some(),
                "expected" => event.expected.is_some(),
                _ => true,
            };
            if !(lifted && parsed) {
                event.attributes.insert(key.clone(), value.clone());
            }
        }

        event
    }

    /// Synthetic event used to verify a channel end to end.
    pub fn test_event(hostname: &str) -> Self {
        let mut event = Self::new("PROCESS_STATE_EXITED", hostname)
            .with_process("supervisor-event-relay-test");
        event.group_name = Some("supervisor-event-relay-test".to_string());
        event.from_state = Some(ProcessState::Running);
        event.expected = Some(false);
        event
    }

    /// One-line summary, used as the mail subject.
    pub fn title(&self) -> String {
        format!(
            "[supervisor] {} {} on {}",
            self.process_name.as_deref().unwrap_or("-"),
            self.kind,
            self.hostname
        )
    }
}

/// Message body shared by every channel.
impl fmt::Display for ProcessEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Host: {}", self.hostname)?;
        match (&self.process_name, &self.group_name) {
            (Some(name), Some(group)) if group != name => {
                writeln!(f, "Process: {name} (group {group})")?
            }
            (Some(name), _) => writeln!(f, "Process: {name}")?,
            (None, _) => {}
        }
        if let Some(pid) = self.pid {
            writeln!(f, "PID: {pid}")?;
        }
        writeln!(f, "Event: {}", self.kind)?;
        match (self.from_state, self.to_state) {
            (Some(from), Some(to)) => writeln!(f, "State: {from} -> {to}")?,
            (None, Some(to)) => writeln!(f, "State: {to}")?,
            (Some(from), None) => writeln!(f, "From state: {from}")?,
            (None, None) => {}
        }
        if let Some(expected) = self.expected {
            writeln!(f, "Expected: {}", if expected { "yes" } else { "no" })?;
        }
        if let Some(data) = self.data.as_deref().filter(|d| !d.is_empty()) {
            writeln!(f, "Data: {data}")?;
        }
        write!(f, "Time: {}", self.timestamp.format("%Y-%m-%d %H:%M:%S"))
    }
}
