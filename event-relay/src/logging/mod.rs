//! Logging setup.
//!
//! stdout carries the event listener protocol, so console logs always go to
//! stderr. An optional directory adds a daily rolling log file.

use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::LoggingConfig;

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "supervisor_event_relay=info,supervisor_proto=info";

/// Base name of rolled log files (`supervisor-event-relay.log.YYYY-MM-DD`).
const LOG_FILE_NAME: &str = "supervisor-event-relay.log";

/// Custom timer that uses the local timezone via chrono.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Resolve the filter: `RUST_LOG` first, then the configured level, then the default.
fn build_filter(level: Option<&str>) -> crate::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level.unwrap_or(DEFAULT_LOG_FILTER))
        .map_err(|e| crate::Error::Other(format!("Invalid log filter directive: {}", e)))
}

/// Initialize logging.
///
/// # Returns
/// The file writer guard when file logging is enabled - keep it alive for the
/// app lifetime so buffered lines are flushed on exit.
pub fn init_logging(config: &LoggingConfig) -> crate::Result<Option<WorkerGuard>> {
    let filter = build_filter(config.level.as_deref())?;

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_timer(LocalTimer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_timer(LocalTimer),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| {
            crate::Error::Other(format!("Failed to set global default subscriber: {}", e))
        })?;

    Ok(guard)
}
