//! Crate error types.

use std::fmt;

/// Errors raised by the healthcheck engine.
///
/// The configuration variants are request-level errors: they are reported
/// instead of a result and never mixed into probe output.
#[derive(Debug)]
pub enum Error {
    /// No probes configured.
    NoProbes,

    /// A configured probe key is not registered.
    UnknownProbe(String),

    /// No output formats configured.
    NoOutputs,

    /// A configured renderer identifier is not registered.
    UnknownOutput(String),

    /// The requested format is not configured.
    FormatNotPresent(String),

    /// Duration requested before the probe timer was started and stopped.
    IncompleteTiming,

    /// The caller went away before the run completed.
    Cancelled,

    /// I/O error.
    Io(std::io::Error),

    /// Custom error with message.
    Custom(String),
}

impl Error {
    /// Returns true for errors caused by the engine configuration or the
    /// requested format.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::NoProbes
                | Error::UnknownProbe(_)
                | Error::NoOutputs
                | Error::UnknownOutput(_)
                | Error::FormatNotPresent(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoProbes => write!(f, "no probes configured"),
            Error::UnknownProbe(key) => write!(f, "probe '{}' is not registered", key),
            Error::NoOutputs => write!(f, "no outputs configured"),
            Error::UnknownOutput(id) => write!(f, "output '{}' is not registered", id),
            Error::FormatNotPresent(format) => {
                write!(f, "output format '{}' is not configured", format)
            }
            Error::IncompleteTiming => write!(f, "probe timer was not started and stopped"),
            Error::Cancelled => write!(f, "healthcheck run cancelled"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::NoProbes.to_string(), "no probes configured");
        assert_eq!(
            Error::UnknownProbe("redis".into()).to_string(),
            "probe 'redis' is not registered"
        );
        assert_eq!(
            Error::FormatNotPresent("xml".into()).to_string(),
            "output format 'xml' is not configured"
        );
    }

    #[test]
    fn test_configuration_errors() {
        assert!(Error::NoOutputs.is_configuration());
        assert!(Error::UnknownOutput("pdf".into()).is_configuration());
        assert!(!Error::IncompleteTiming.is_configuration());
        assert!(!Error::Cancelled.is_configuration());
    }
}
