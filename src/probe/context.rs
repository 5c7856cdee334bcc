//! Explicit dependencies handed to every probe factory.

use std::fmt;
use std::sync::Arc;

use crate::config::ProbeConfig;

use super::cache::CacheManager;
use super::database::ConnectionPool;
use super::external_import::ImportLog;
use super::mailjet::EmailLog;
use super::saml_metadata::MetadataSource;
use super::scheduler::TaskRepository;
use super::solr::IndexQueue;
use super::solr_core::{CorePinger, SiteRepository};

/// Error returned by backend collaborators.
///
/// Probes never propagate it: it becomes an error message, with the text
/// appended only in debug mode.
#[derive(Debug, Clone)]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BackendError {}

impl From<String> for BackendError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for BackendError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Subsystem collaborators. A probe is applicable only when its backend is set.
#[derive(Clone, Default)]
pub struct Backends {
    pub database: Option<Arc<dyn ConnectionPool>>,
    pub cache: Option<Arc<dyn CacheManager>>,
    pub scheduler: Option<Arc<dyn TaskRepository>>,
    pub import_log: Option<Arc<dyn ImportLog>>,
    pub index_queue: Option<Arc<dyn IndexQueue>>,
    pub solr_sites: Option<Arc<dyn SiteRepository>>,
    pub solr_pinger: Option<Arc<dyn CorePinger>>,
    pub email_log: Option<Arc<dyn EmailLog>>,
    pub saml_metadata: Option<Arc<dyn MetadataSource>>,
}

impl Backends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(mut self, pool: Arc<dyn ConnectionPool>) -> Self {
        self.database = Some(pool);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_scheduler(mut self, tasks: Arc<dyn TaskRepository>) -> Self {
        self.scheduler = Some(tasks);
        self
    }

    pub fn with_import_log(mut self, log: Arc<dyn ImportLog>) -> Self {
        self.import_log = Some(log);
        self
    }

    pub fn with_index_queue(mut self, queue: Arc<dyn IndexQueue>) -> Self {
        self.index_queue = Some(queue);
        self
    }

    /// Site repository for the Solr core probe. Cores are pinged over HTTP
    /// unless a pinger is set with [`Backends::with_solr_pinger`].
    pub fn with_solr_sites(mut self, sites: Arc<dyn SiteRepository>) -> Self {
        self.solr_sites = Some(sites);
        self
    }

    pub fn with_solr_pinger(mut self, pinger: Arc<dyn CorePinger>) -> Self {
        self.solr_pinger = Some(pinger);
        self
    }

    pub fn with_email_log(mut self, log: Arc<dyn EmailLog>) -> Self {
        self.email_log = Some(log);
        self
    }

    pub fn with_saml_metadata(mut self, source: Arc<dyn MetadataSource>) -> Self {
        self.saml_metadata = Some(source);
        self
    }

    /// Names of the configured subsystems, for the startup summary.
    pub fn configured(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.database.is_some() {
            names.push("database");
        }
        if self.cache.is_some() {
            names.push("cache");
        }
        if self.scheduler.is_some() {
            names.push("scheduler");
        }
        if self.import_log.is_some() {
            names.push("import_log");
        }
        if self.index_queue.is_some() {
            names.push("index_queue");
        }
        if self.solr_sites.is_some() {
            names.push("solr_sites");
        }
        if self.email_log.is_some() {
            names.push("email_log");
        }
        if self.saml_metadata.is_some() {
            names.push("saml_metadata");
        }
        names
    }
}

/// Everything a probe factory may read: thresholds, debug flag, backends.
#[derive(Clone, Default)]
pub struct ProbeContext {
    pub config: Arc<ProbeConfig>,
    pub debug: bool,
    pub backends: Backends,
}

impl ProbeContext {
    pub fn new(config: ProbeConfig, backends: Backends) -> Self {
        Self {
            config: Arc::new(config),
            debug: false,
            backends,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
