//! Request routing.
//!
//! | Path | Route |
//! |------|-------|
//! | `/health` | liveness of this process |
//! | `/{segment}/{secret}/{format}` | healthcheck, format defaults to `html` |
//! | `/{segment}-pause/{secret}/?probe={identifier}` | pause a probe |
//! | `/{segment}-play/{secret}/?probe={identifier}` | resume a probe |

use percent_encoding::percent_decode_str;

/// Format used when the path names none.
pub const DEFAULT_FORMAT: &str = "html";

/// Resolved route of a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Liveness,
    Healthcheck { secret: String, format: String },
    Pause { secret: String },
    Play { secret: String },
    NotFound,
}

/// Resolve `path` for the configured first path segment.
pub fn route(path: &str, segment: &str) -> Route {
    if path == "/health" {
        return Route::Liveness;
    }

    let mut parts = path.trim_start_matches('/').split('/');
    let first = parts.next().unwrap_or_default();
    let secret = decode(parts.next().unwrap_or_default());

    if first == segment {
        let format = decode(parts.next().unwrap_or_default());
        let format = if format.is_empty() {
            DEFAULT_FORMAT.to_string()
        } else {
            format.to_lowercase()
        };
        return Route::Healthcheck { secret, format };
    }

    match first.strip_prefix(segment) {
        Some("-pause") => Route::Pause { secret },
        Some("-play") => Route::Play { secret },
        _ => Route::NotFound,
    }
}

/// First value of a query parameter, percent-decoded.
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| decode(&value.replace('+', " ")))
        .filter(|value| !value.is_empty())
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
