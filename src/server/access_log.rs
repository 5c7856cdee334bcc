//! Access logging.
//!
//! Access lines go through `tracing` with `target: "access"`; the JSON
//! formatter turns them into `"type":"access"` entries with a
//! `METHOD /path STATUS` message.

use std::net::IpAddr;

use tracing::info;

/// One served request.
#[derive(Debug, Clone)]
pub struct AccessEntry<'a> {
    pub request_id: &'a str,
    pub ip: IpAddr,
    pub method: &'a str,
    pub path: &'a str,
    pub status: u16,
    pub bytes: u64,
    pub duration_ms: f64,
    pub user_agent: Option<&'a str>,
}

/// Log a request using the unified log format.
pub fn log_request(entry: &AccessEntry<'_>) {
    info!(
        target: "access",
        request_id = entry.request_id,
        ip = %entry.ip,
        method = entry.method,
        path = entry.path,
        status = entry.status,
        bytes = entry.bytes,
        duration_ms = entry.duration_ms,
        ua = entry.user_agent,
    );
}
