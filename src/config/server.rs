//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use super::parse::{env_bool, env_opt, env_or};
use super::ConfigError;

/// One Solr core endpoint given on the command line environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolrCoreEndpoint {
    /// Site identifier.
    pub site: String,
    /// Language key.
    pub language: String,
    /// Base URL of the core, e.g. `http://solr:8983/solr/core_en`.
    pub url: String,
}

impl SolrCoreEndpoint {
    /// Parse `site:language=url` entries separated by whitespace.
    pub fn parse_list(key: &str, s: &str) -> Result<Vec<Self>, ConfigError> {
        s.split_whitespace()
            .map(|entry| {
                let invalid = || ConfigError::Invalid {
                    key: key.into(),
                    message: format!("expected site:language=url, got '{}'", entry),
                };
                let (target, url) = entry.split_once('=').ok_or_else(invalid)?;
                let (site, language) = target.split_once(':').ok_or_else(invalid)?;
                if site.is_empty() || language.is_empty() || url.is_empty() {
                    return Err(invalid());
                }
                Ok(Self {
                    site: site.to_string(),
                    language: language.to_string(),
                    url: url.to_string(),
                })
            })
            .collect()
    }
}

/// HTTP host configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:8080).
    pub listen_addr: SocketAddr,
    /// First path segment of the healthcheck URL (default: healthcheck).
    pub path_segment: String,
    /// Secret expected as second path segment. Empty refuses every request.
    pub secret: String,
    /// Allowed caller IP patterns. Empty refuses every request.
    pub allowed_ips: String,
    /// Access logging enabled.
    pub access_log: bool,
    /// Persist pause flags in this JSON file instead of memory.
    pub pause_file: Option<PathBuf>,
    /// Solr cores checked by the built-in Solr core backend.
    pub solr_cores: Vec<SolrCoreEndpoint>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            path_segment: "healthcheck".to_string(),
            secret: String::new(),
            allowed_ips: String::new(),
            access_log: false,
            pause_file: None,
            solr_cores: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr: SocketAddr = env_or("LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .map_err(|e| ConfigError::Parse {
                key: "LISTEN_ADDR".into(),
                value: env_or("LISTEN_ADDR", "0.0.0.0:8080"),
                error: format!("{}", e),
            })?;

        let path_segment = env_or("HEALTHCHECK_PATH_SEGMENT", "healthcheck")
            .trim_matches('/')
            .to_string();
        if path_segment.is_empty() || path_segment.contains('/') {
            return Err(ConfigError::Invalid {
                key: "HEALTHCHECK_PATH_SEGMENT".into(),
                message: "must be a single non-empty path segment".into(),
            });
        }

        Ok(Self {
            listen_addr,
            path_segment,
            secret: env_or("HEALTHCHECK_SECRET", ""),
            allowed_ips: env_or("HEALTHCHECK_ALLOWED_IPS", ""),
            access_log: env_bool("ACCESS_LOG", false),
            pause_file: env_opt("HEALTHCHECK_PAUSE_FILE").map(PathBuf::from),
            solr_cores: SolrCoreEndpoint::parse_list(
                "HEALTHCHECK_SOLR_CORES",
                &env_or("HEALTHCHECK_SOLR_CORES", ""),
            )?,
        })
    }
}
