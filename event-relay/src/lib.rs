//! supervisor-event-relay library crate.
//!
//! Receives supervisord process events, filters them against the configured
//! watch-set and forwards a rendered message to the single configured channel.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod listener;
pub mod logging;
pub mod notify;
pub mod utils;

pub use config::Config;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{Error, Result};
pub use event::{ProcessEvent, ProcessState};
pub use listener::EventListener;
pub use notify::{Notifier, build_notifier};
