pub mod http_client;

/// Host name stamped into every event, resolved once at startup.
pub fn hostname() -> String {
    sysinfo::System::host_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
