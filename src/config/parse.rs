//! Environment variable parsing utilities.

use std::str::FromStr;
use std::time::Duration;

use super::ConfigError;

/// Get environment variable with default value.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get optional environment variable (None if empty or missing).
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

/// Parse environment variable as boolean.
/// Treats "1", "true" (case-insensitive) as true.
pub fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

/// Parse environment variable with type conversion.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v.trim().parse().map_err(|e: T::Err| ConfigError::Parse {
            key: key.into(),
            value: v,
            error: e.to_string(),
        }),
        _ => Ok(default),
    }
}

/// Parse a comma separated environment variable into its trimmed, non-empty parts.
pub fn env_list(key: &str, default: &str) -> Vec<String> {
    parse_list(&env_or(key, default))
}

/// Split a comma separated list. Order and duplicates are preserved.
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a `name=value,name=value` list into ordered pairs.
///
/// Names are lowercased. A bare `name` maps to itself.
pub fn parse_pairs(key: &str, s: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for part in parse_list(s) {
        let (name, value) = match part.split_once('=') {
            Some((name, value)) => (name.trim().to_lowercase(), value.trim().to_string()),
            None => (part.to_lowercase(), part.to_lowercase()),
        };

        if name.is_empty() || value.is_empty() {
            return Err(ConfigError::Invalid {
                key: key.into(),
                message: format!("malformed entry '{}'", part),
            });
        }

        if pairs.iter().any(|(existing, _)| *existing == name) {
            return Err(ConfigError::DuplicateFormat {
                key: key.into(),
                format: name,
            });
        }

        pairs.push((name, value));
    }

    Ok(pairs)
}

/// Parse duration string (e.g., "500ms", "30s", "2m", "1h").
/// Returns None for "off" or "0".
pub fn parse_duration(s: &str) -> Result<Option<Duration>, String> {
    let s = s.trim().to_lowercase();

    if s == "off" || s == "0" || s.is_empty() {
        return Ok(None);
    }

    let (num_str, unit_ms) = if let Some(num) = s.strip_suffix("ms") {
        (num, 1)
    } else if let Some(num) = s.strip_suffix('s') {
        (num, 1_000)
    } else if let Some(num) = s.strip_suffix('m') {
        (num, 60_000)
    } else if let Some(num) = s.strip_suffix('h') {
        (num, 3_600_000)
    } else {
        // Plain seconds
        (s.as_str(), 1_000)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration: {}", s))?;

    let millis = num
        .checked_mul(unit_ms)
        .ok_or_else(|| format!("duration out of range: {}", s))?;

    Ok(Some(Duration::from_millis(millis)))
}

/// Parse environment variable as duration.
pub fn env_duration(key: &str, default: &str) -> Result<Option<Duration>, ConfigError> {
    let value = env_or(key, default);
    parse_duration(&value).map_err(|e| ConfigError::Parse {
        key: key.into(),
        value,
        error: e,
    })
}
