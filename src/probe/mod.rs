//! Probes: independent checks of one subsystem each.
//!
//! Every probe produces a [`ProbeResult`] with an ordered list of messages.
//! The result status is derived from the messages: one error message turns
//! the probe into [`Status::Error`] for good.
//!
//! # Built-in probes
//!
//! | Key | Probe | Backend |
//! |-----|-------|---------|
//! | `database` | [`DatabaseProbe`] | [`ConnectionPool`] |
//! | `cache` | [`CacheProbe`] | [`CacheManager`] |
//! | `scheduler` | [`SchedulerProbe`] | [`TaskRepository`] |
//! | `external_import` | [`ExternalImportProbe`] | [`ImportLog`] |
//! | `solr` | [`SolrProbe`] | [`IndexQueue`] |
//! | `solr_core` | [`SolrCoreProbe`] | [`SiteRepository`] + [`CorePinger`] |
//! | `mailjet` | [`MailjetProbe`] | [`EmailLog`] |
//! | `saml_metadata` | [`SamlMetadataProbe`] | [`MetadataSource`] |
//! | `dummy` | [`DummyProbe`] | - |
//!
//! A probe whose backend is missing from the [`ProbeContext`] reports
//! itself as not applicable and is skipped by the runner.
//!
//! # Writing a probe
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use healthcheck::probe::{Probe, ProbeBase, ProbeResult};
//!
//! struct DiskProbe {
//!     base: ProbeBase,
//! }
//!
//! #[async_trait]
//! impl Probe for DiskProbe {
//!     fn identifier(&self) -> &str { self.base.identifier() }
//!     fn title(&self) -> &str { self.base.title() }
//!
//!     async fn run(&mut self) {
//!         self.base.start();
//!         self.base.success("disk has space left");
//!         self.base.stop();
//!     }
//!
//!     fn result(&self) -> &ProbeResult { self.base.result() }
//! }
//! ```

pub mod cache;
mod context;
pub mod database;
mod dummy;
pub mod external_import;
pub mod mailjet;
mod outcome;
pub mod saml_metadata;
pub mod scheduler;
pub mod solr;
pub mod solr_core;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use async_trait::async_trait;

pub use cache::{CacheManager, CacheProbe, CacheRegion};
pub use context::{BackendError, Backends, ProbeContext};
pub use database::{ConnectionPool, DatabaseProbe};
pub use dummy::DummyProbe;
pub use external_import::{ExternalImportProbe, ImportLog, ImportLogEntry};
pub use mailjet::{EmailLog, MailjetProbe};
pub use outcome::{ProbeMessage, ProbeResult, Status};
pub use saml_metadata::{MetadataSource, SamlMetadataProbe};
pub use scheduler::{ScheduledTask, SchedulerProbe, TaskRepository};
pub use solr::{IndexQueue, SolrProbe};
pub use solr_core::{
    CorePinger, HttpCorePinger, SiteRepository, SolrConnection, SolrCoreProbe, SolrLanguage,
    SolrSettings, SolrSite, StaticSites,
};

/// A single check of one subsystem.
///
/// A fresh instance is created for every healthcheck run, so `run` is
/// called at most once per instance. Implementations must call start and
/// stop on their timer (see [`ProbeBase`]) and must not let backend errors
/// escape: they become error messages.
#[async_trait]
pub trait Probe: Send {
    /// Stable identifier, also used as the pause key.
    fn identifier(&self) -> &str;

    /// Human readable title.
    fn title(&self) -> &str;

    /// Whether the probe applies to this host. Inapplicable probes are
    /// skipped without a trace in the result.
    fn use_probe(&self) -> bool {
        true
    }

    /// Performs the check and records its messages.
    async fn run(&mut self);

    /// The result of the last run.
    fn result(&self) -> &ProbeResult;
}

/// Identity, timer and message helpers shared by probe implementations.
#[derive(Debug, Clone)]
pub struct ProbeBase {
    identifier: String,
    title: String,
    debug: bool,
    result: ProbeResult,
}

impl ProbeBase {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            debug: false,
            result: ProbeResult::new(),
        }
    }

    /// Append backend error details to error messages.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn result(&self) -> &ProbeResult {
        &self.result
    }

    pub fn start(&mut self) {
        self.result.mark_started();
    }

    pub fn stop(&mut self) {
        self.result.mark_stopped();
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.result.add_success_message(text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.result.add_error_message(text);
    }

    /// Records an error message. The cause is only shown in debug mode.
    pub fn error_with_cause(&mut self, text: impl Into<String>, cause: &dyn fmt::Display) {
        let text = text.into();
        if self.debug {
            self.result.add_error_message(format!("{}: {}", text, cause));
        } else {
            self.result.add_error_message(text);
        }
    }
}
