//! Filter-then-deliver step between event arrival and the active notifier.

use std::sync::Arc;

use tracing::{debug, info};

use crate::Result;
use crate::config::{Config, WatchSet};
use crate::event::ProcessEvent;
use crate::notify::{Notifier, build_notifier};

/// What `dispatch` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event kind is not watched; nothing was sent.
    Skipped,
    /// The notifier accepted the event.
    Delivered,
}

/// Routes watched events to the single configured notifier.
///
/// Holds no mutable state, so it can be shared freely between callers.
#[derive(Clone)]
pub struct Dispatcher {
    watch_events: WatchSet,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(watch_events: WatchSet, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            watch_events,
            notifier,
        }
    }

    /// Build the dispatcher and its notifier from a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let notifier = build_notifier(&config.channel, &config.transport)?;
        info!(
            channel = notifier.channel_type(),
            watch_events = ?config.watch_events.iter().collect::<Vec<_>>(),
            "Notifier ready"
        );
        Ok(Self::new(config.watch_events.clone(), notifier))
    }

    pub fn is_watched(&self, kind: &str) -> bool {
        self.watch_events.contains(kind)
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Deliver `event` if its kind is watched.
    ///
    /// Unwatched events are skipped silently. Delivery errors are returned
    /// unchanged.
    pub async fn dispatch(&self, event: &ProcessEvent) -> Result<DispatchOutcome> {
        if !self.is_watched(&event.kind) {
            debug!(kind = %event.kind, "Skipping unwatched event");
            return Ok(DispatchOutcome::Skipped);
        }

        self.notifier.send(event).await?;
        Ok(DispatchOutcome::Delivered)
    }
}
