//! Configuration module for healthcheck.
//!
//! This module provides centralized configuration loading from environment variables.
//! The configuration is read once at startup and shared read-only with every request.
//!
//! # Example
//!
//! ```rust,ignore
//! use healthcheck::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! println!("Probes: {:?}", config.healthcheck.probes);
//! ```

mod error;
mod healthcheck;
mod logging;
mod parse;
mod probes;
mod runner;
mod server;

pub use error::ConfigError;
pub use healthcheck::HealthcheckConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::{parse_duration, parse_list};
pub use probes::ProbeConfig;
pub use runner::{ExecutionMode, RunnerConfig};
pub use server::{ServerConfig, SolrCoreEndpoint};

/// Probe key used when only Solr cores are configured.
const DEFAULT_SOLR_PROBE: &str = "solr_core";

/// Complete application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// HTTP host configuration.
    pub server: ServerConfig,
    /// Engine configuration.
    pub healthcheck: HealthcheckConfig,
    /// Probe thresholds.
    pub probes: ProbeConfig,
    /// Execution mode.
    pub runner: RunnerConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Without `HEALTHCHECK_PROBES` the probe list only holds what the binary
    /// can check on its own: `solr_core` when Solr cores are configured,
    /// nothing otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            server: ServerConfig::from_env()?,
            healthcheck: HealthcheckConfig::from_env()?,
            probes: ProbeConfig::from_env()?,
            runner: RunnerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        };
        config.apply_default_probes();
        Ok(config)
    }

    fn apply_default_probes(&mut self) {
        if self.healthcheck.probes.is_empty() && !self.server.solr_cores.is_empty() {
            self.healthcheck.probes = vec![DEFAULT_SOLR_PROBE.to_string()];
        }
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::{info, warn};

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.listen_addr);
        info!("  Path segment: /{}/", self.server.path_segment);
        if self.healthcheck.probes.is_empty() {
            warn!("  Probes: none, set HEALTHCHECK_PROBES");
        } else {
            info!("  Probes: {}", self.healthcheck.probes.join(", "));
        }
        info!(
            "  Outputs: {}",
            self.healthcheck.format_names().collect::<Vec<_>>().join(", ")
        );

        match self.runner.mode {
            ExecutionMode::Sequential => info!("  Mode: sequential"),
            ExecutionMode::Concurrent => info!(
                "  Mode: concurrent ({} workers, timeout {:?})",
                self.runner.worker_count(),
                self.runner.probe_timeout
            ),
        }

        if let Some(ref path) = self.server.pause_file {
            info!("  Pause file: {}", path.display());
        }

        if self.healthcheck.debug {
            info!("  Debug: enabled");
        }

        if self.server.secret.is_empty() {
            warn!("  HEALTHCHECK_SECRET is empty, every request will be refused");
        }

        if self.server.allowed_ips.is_empty() {
            warn!("  HEALTHCHECK_ALLOWED_IPS is empty, every request will be refused");
        }
    }
}
