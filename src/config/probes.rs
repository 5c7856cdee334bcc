//! Per-probe thresholds.

use std::time::Duration;

use super::parse::{env_duration, env_list, env_parse};
use super::ConfigError;

/// Numeric thresholds consulted by the built-in probes.
#[derive(Clone, Debug)]
pub struct ProbeConfig {
    /// Scheduler: minutes a task may be overdue before it counts as late.
    pub scheduler_max_minutes_late: i64,
    /// Solr: errored index queue items tolerated.
    pub solr_max_error_count: u64,
    /// Solr core: liveness request timeout.
    pub solr_timeout: Duration,
    /// Mail delivery: emails needed before percentages apply.
    pub mail_min_sample_size: u64,
    /// Mail delivery: failure percentage reported as warning.
    pub mail_warning_percent: f64,
    /// Mail delivery: failure percentage reported as critical.
    pub mail_critical_percent: f64,
    /// Cache: region names never probed.
    pub cache_ignored: Vec<String>,
    /// SAML metadata: tolerance shown next to the expiry.
    pub saml_tolerance_minutes: i64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            scheduler_max_minutes_late: 10,
            solr_max_error_count: 0,
            solr_timeout: Duration::from_secs(5),
            mail_min_sample_size: 10,
            mail_warning_percent: 5.0,
            mail_critical_percent: 20.0,
            cache_ignored: Vec::new(),
            saml_tolerance_minutes: 30,
        }
    }
}

impl ProbeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            scheduler_max_minutes_late: env_parse(
                "HEALTHCHECK_SCHEDULER_MAX_MINUTES_LATE",
                defaults.scheduler_max_minutes_late,
            )?,
            solr_max_error_count: env_parse(
                "HEALTHCHECK_SOLR_MAX_ERROR_COUNT",
                defaults.solr_max_error_count,
            )?,
            solr_timeout: env_duration("HEALTHCHECK_SOLR_TIMEOUT", "5s")?
                .unwrap_or(defaults.solr_timeout),
            mail_min_sample_size: env_parse(
                "HEALTHCHECK_MAIL_MIN_SAMPLE_SIZE",
                defaults.mail_min_sample_size,
            )?,
            mail_warning_percent: env_parse(
                "HEALTHCHECK_MAIL_WARNING_PERCENT",
                defaults.mail_warning_percent,
            )?,
            mail_critical_percent: env_parse(
                "HEALTHCHECK_MAIL_CRITICAL_PERCENT",
                defaults.mail_critical_percent,
            )?,
            cache_ignored: env_list("HEALTHCHECK_CACHE_IGNORED", ""),
            saml_tolerance_minutes: env_parse(
                "HEALTHCHECK_SAML_TOLERANCE_MINUTES",
                defaults.saml_tolerance_minutes,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mail_warning_percent > self.mail_critical_percent {
            return Err(ConfigError::Invalid {
                key: "HEALTHCHECK_MAIL_WARNING_PERCENT".into(),
                message: format!(
                    "warning threshold {} is above critical threshold {}",
                    self.mail_warning_percent, self.mail_critical_percent
                ),
            });
        }
        if self.scheduler_max_minutes_late < 0 {
            return Err(ConfigError::Invalid {
                key: "HEALTHCHECK_SCHEDULER_MAX_MINUTES_LATE".into(),
                message: "must not be negative".into(),
            });
        }
        Ok(())
    }
}
