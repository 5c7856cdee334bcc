//! Engine configuration: which probes run and how results are rendered.

use super::parse::{env_bool, env_list, env_opt, env_or, parse_pairs};
use super::ConfigError;

/// Healthcheck engine configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct HealthcheckConfig {
    /// Include detailed error texts in responses.
    pub debug: bool,
    /// Render timestamp and caller IP in the HTML output.
    pub additional_info: bool,
    /// Probe registry keys in execution order. Duplicates run twice.
    /// Empty unless configured; see [`Config::from_env`](super::Config::from_env).
    pub probes: Vec<String>,
    /// Output format name (lowercase) to renderer identifier, in configured order.
    pub outputs: Vec<(String, String)>,
    /// Title used by the HTML output.
    pub site_name: String,
    /// Logo image URL for the HTML output.
    pub html_logo: Option<String>,
    /// Background image URL for the HTML output.
    pub html_background: Option<String>,
}

impl Default for HealthcheckConfig {
    fn default() -> Self {
        Self {
            debug: false,
            additional_info: false,
            probes: Vec::new(),
            outputs: vec![
                ("html".to_string(), "html".to_string()),
                ("json".to_string(), "json".to_string()),
            ],
            site_name: "Healthcheck".to_string(),
            html_logo: None,
            html_background: None,
        }
    }
}

impl HealthcheckConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            debug: env_bool("HEALTHCHECK_DEBUG", false),
            additional_info: env_bool("HEALTHCHECK_ADDITIONAL_INFO", false),
            probes: env_list("HEALTHCHECK_PROBES", ""),
            outputs: parse_pairs(
                "HEALTHCHECK_OUTPUTS",
                &env_or("HEALTHCHECK_OUTPUTS", "html=html,json=json"),
            )?,
            site_name: env_or("HEALTHCHECK_SITE_NAME", "Healthcheck"),
            html_logo: env_opt("HEALTHCHECK_HTML_LOGO"),
            html_background: env_opt("HEALTHCHECK_HTML_BACKGROUND"),
        })
    }

    /// Look up the renderer identifier configured for a format name.
    pub fn output_for(&self, format: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|(name, _)| name == format)
            .map(|(_, identifier)| identifier.as_str())
    }

    /// Configured format names.
    pub fn format_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|(name, _)| name.as_str())
    }
}
