//! Probe execution mode.

use std::time::Duration;

use super::parse::{env_duration, env_or, env_parse};
use super::ConfigError;

/// How the runner schedules probes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One probe after the other, in configured order.
    Sequential,
    /// Bounded pool, one task per probe.
    Concurrent,
}

/// Runner configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Execution mode (HEALTHCHECK_MODE).
    pub mode: ExecutionMode,
    /// Maximum probes in flight in concurrent mode (0 = auto-detect).
    pub concurrency: usize,
    /// Per-probe timeout in concurrent mode.
    pub probe_timeout: Option<Duration>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            concurrency: 0,
            probe_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode = match env_or("HEALTHCHECK_MODE", "sequential").to_lowercase().as_str() {
            "sequential" => ExecutionMode::Sequential,
            "concurrent" => ExecutionMode::Concurrent,
            other => {
                return Err(ConfigError::Invalid {
                    key: "HEALTHCHECK_MODE".into(),
                    message: format!("expected sequential or concurrent, got '{}'", other),
                })
            }
        };

        Ok(Self {
            mode,
            concurrency: env_parse("HEALTHCHECK_CONCURRENCY", 0)?,
            probe_timeout: env_duration("HEALTHCHECK_PROBE_TIMEOUT", "30s")?,
        })
    }

    /// Effective worker bound for concurrent mode.
    pub fn worker_count(&self) -> usize {
        if self.concurrency == 0 {
            num_cpus::get()
        } else {
            self.concurrency
        }
    }
}
