//! Configuration error types.

use std::fmt;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse environment variable.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// The same output format name was mapped twice.
    DuplicateFormat { key: String, format: String },
    /// Invalid value for environment variable.
    Invalid { key: String, message: String },
    /// IO error (e.g., reading the pause file).
    Io { path: String, error: std::io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "failed to parse {}='{}': {}", key, value, error)
            }
            ConfigError::DuplicateFormat { key, format } => {
                write!(f, "{} maps output format '{}' more than once", key, format)
            }
            ConfigError::Invalid { key, message } => {
                write!(f, "invalid value for {}: {}", key, message)
            }
            ConfigError::Io { path, error } => {
                write!(f, "IO error for '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Parse {
            key: "HEALTHCHECK_SOLR_MAX_ERROR_COUNT".into(),
            value: "many".into(),
            error: "invalid digit found in string".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse HEALTHCHECK_SOLR_MAX_ERROR_COUNT='many': invalid digit found in string"
        );

        let err = ConfigError::DuplicateFormat {
            key: "HEALTHCHECK_OUTPUTS".into(),
            format: "json".into(),
        };
        assert_eq!(
            err.to_string(),
            "HEALTHCHECK_OUTPUTS maps output format 'json' more than once"
        );

        let err = ConfigError::Invalid {
            key: "HEALTHCHECK_MODE".into(),
            message: "expected sequential or concurrent".into(),
        };
        assert!(err.to_string().starts_with("invalid value for HEALTHCHECK_MODE"));
    }
}
