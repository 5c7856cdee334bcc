//! Solr core connectivity probe.
//!
//! Every language of every site that has a Solr core configured is pinged
//! at `{scheme}://{host}:{port}{path}/solr/{core}/admin/ping?wt=json`.
//! Connection settings come from the site; the core may be overridden per
//! language.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use super::{BackendError, Probe, ProbeBase, ProbeContext, ProbeResult};
use crate::config::SolrCoreEndpoint;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8983;
const DEFAULT_PATH: &str = "/";
const DEFAULT_SCHEME: &str = "http";

/// Resolved connection to one Solr core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolrConnection {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub core: String,
}

impl SolrConnection {
    /// Liveness endpoint of the core.
    pub fn ping_url(&self) -> String {
        format!(
            "{}://{}:{}{}/solr/{}/admin/ping?wt=json",
            self.scheme,
            self.host,
            self.port,
            self.path.trim_end_matches('/'),
            self.core
        )
    }

    /// Split a core URL such as `http://solr:8983/solr/core_en` into its parts.
    pub fn from_core_url(url: &str) -> Result<Self, String> {
        let parsed = Url::parse(url).map_err(|e| format!("invalid core URL '{}': {}", url, e))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| format!("core URL '{}' has no host", url))?
            .to_string();
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| format!("core URL '{}' has no port", url))?;

        let mut segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|segment| !segment.is_empty()).collect())
            .unwrap_or_default();
        let core = segments
            .pop()
            .ok_or_else(|| format!("core URL '{}' names no core", url))?
            .to_string();
        if segments.last() == Some(&"solr") {
            segments.pop();
        }

        Ok(Self {
            scheme: parsed.scheme().to_string(),
            host,
            port,
            path: format!("/{}", segments.join("/")),
            core,
        })
    }
}

/// Solr settings of a site. Unset values fall back to the defaults.
#[derive(Debug, Clone, Default)]
pub struct SolrSettings {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub core: Option<String>,
}

/// A site language with an optional core override.
#[derive(Debug, Clone)]
pub struct SolrLanguage {
    pub language: String,
    pub core: Option<String>,
}

/// A site with its Solr settings and languages.
#[derive(Debug, Clone)]
pub struct SolrSite {
    pub identifier: String,
    pub settings: SolrSettings,
    pub languages: Vec<SolrLanguage>,
}

impl SolrSite {
    /// Resolve one connection per language that ends up with a core.
    pub fn connections(&self) -> Vec<(String, SolrConnection)> {
        let settings = &self.settings;

        self.languages
            .iter()
            .filter_map(|language| {
                let core = language
                    .core
                    .as_ref()
                    .or(settings.core.as_ref())
                    .filter(|core| !core.is_empty())?;

                Some((
                    language.language.clone(),
                    SolrConnection {
                        scheme: settings.scheme.clone().unwrap_or_else(|| DEFAULT_SCHEME.into()),
                        host: settings.host.clone().unwrap_or_else(|| DEFAULT_HOST.into()),
                        port: settings.port.unwrap_or(DEFAULT_PORT),
                        path: settings.path.clone().unwrap_or_else(|| DEFAULT_PATH.into()),
                        core: core.clone(),
                    },
                ))
            })
            .collect()
    }
}

/// Source of the host's sites.
#[async_trait]
pub trait SiteRepository: Send + Sync {
    async fn sites(&self) -> Result<Vec<SolrSite>, BackendError>;
}

/// Issues the liveness request against a core.
#[async_trait]
pub trait CorePinger: Send + Sync {
    /// Returns the `status` field of the response, `None` when the body
    /// carries none. Transport failures are errors.
    async fn ping(&self, url: &str, timeout: Duration) -> Result<Option<String>, BackendError>;
}

/// [`CorePinger`] over HTTP.
#[derive(Clone, Default)]
pub struct HttpCorePinger {
    client: reqwest::Client,
}

impl HttpCorePinger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CorePinger for HttpCorePinger {
    async fn ping(&self, url: &str, timeout: Duration) -> Result<Option<String>, BackendError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| BackendError::new(e.to_string()))?;

        // Non-2xx answers are still inspected; Solr reports failures in the body.
        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(_) => return Ok(None),
        };

        Ok(body
            .get("status")
            .and_then(|status| status.as_str())
            .map(str::to_string))
    }
}

/// Fixed site list built from configured core URLs.
#[derive(Debug, Clone, Default)]
pub struct StaticSites {
    sites: Vec<SolrSite>,
}

impl StaticSites {
    pub fn new(sites: Vec<SolrSite>) -> Self {
        Self { sites }
    }

    /// One single-language site entry per endpoint.
    pub fn from_endpoints(endpoints: &[SolrCoreEndpoint]) -> Result<Self, String> {
        let sites = endpoints
            .iter()
            .map(|endpoint| {
                let connection = SolrConnection::from_core_url(&endpoint.url)?;
                Ok(SolrSite {
                    identifier: endpoint.site.clone(),
                    settings: SolrSettings {
                        scheme: Some(connection.scheme),
                        host: Some(connection.host),
                        port: Some(connection.port),
                        path: Some(connection.path),
                        core: None,
                    },
                    languages: vec![SolrLanguage {
                        language: endpoint.language.clone(),
                        core: Some(connection.core),
                    }],
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        Ok(Self { sites })
    }
}

#[async_trait]
impl SiteRepository for StaticSites {
    async fn sites(&self) -> Result<Vec<SolrSite>, BackendError> {
        Ok(self.sites.clone())
    }
}

/// Pings the Solr core of every site language.
pub struct SolrCoreProbe {
    base: ProbeBase,
    sites: Option<Arc<dyn SiteRepository>>,
    pinger: Option<Arc<dyn CorePinger>>,
    timeout: Duration,
}

impl SolrCoreProbe {
    pub const IDENTIFIER: &'static str = "SolrCoreProbe";

    pub fn new(context: &ProbeContext) -> Self {
        Self {
            base: ProbeBase::new(Self::IDENTIFIER, "Solr core connectivity")
                .with_debug(context.debug),
            sites: context.backends.solr_sites.clone(),
            pinger: context.backends.solr_pinger.clone(),
            timeout: context.config.solr_timeout,
        }
    }

    async fn check_core(
        &mut self,
        pinger: &dyn CorePinger,
        site: &str,
        language: &str,
        connection: &SolrConnection,
    ) {
        let target = format!(
            "Site \"{}\", language {}: core \"{}\" on {}:{}",
            site, language, connection.core, connection.host, connection.port
        );

        match pinger.ping(&connection.ping_url(), self.timeout).await {
            Ok(Some(status)) if status == "OK" => {
                self.base.success(format!("{} is reachable", target));
            }
            Ok(_) => self.base.error(format!("{} returned an invalid response", target)),
            Err(e) => self
                .base
                .error_with_cause(format!("{} is not reachable", target), &e),
        }
    }
}

#[async_trait]
impl Probe for SolrCoreProbe {
    fn identifier(&self) -> &str {
        self.base.identifier()
    }

    fn title(&self) -> &str {
        self.base.title()
    }

    fn use_probe(&self) -> bool {
        self.sites.is_some()
    }

    async fn run(&mut self) {
        self.base.start();

        if let Some(repository) = self.sites.clone() {
            let pinger: Arc<dyn CorePinger> = self
                .pinger
                .clone()
                .unwrap_or_else(|| Arc::new(HttpCorePinger::new()));

            match repository.sites().await {
                Ok(sites) if sites.is_empty() => self.base.error("No sites found"),
                Ok(sites) => {
                    let mut checked = 0;
                    for site in &sites {
                        for (language, connection) in site.connections() {
                            checked += 1;
                            self.check_core(pinger.as_ref(), &site.identifier, &language, &connection)
                                .await;
                        }
                    }
                    if checked == 0 {
                        self.base.error("No Solr cores configured");
                    }
                }
                Err(e) => self
                    .base
                    .error_with_cause("Site configuration could not be read", &e),
            }
        }

        self.base.stop();
    }

    fn result(&self) -> &ProbeResult {
        self.base.result()
    }
}
