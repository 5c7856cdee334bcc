//! Name-based lookup of probe and output constructors.
//!
//! Both registries are populated explicitly at startup and are read-only
//! afterwards. Configuration refers to entries by key only.

use std::collections::HashMap;
use std::sync::Arc;

use crate::output::{DummyOutput, HtmlOutput, JsonOutput, Output};
use crate::probe::{
    CacheProbe, DatabaseProbe, DummyProbe, ExternalImportProbe, MailjetProbe, Probe, ProbeContext,
    SamlMetadataProbe, SchedulerProbe, SolrCoreProbe, SolrProbe,
};

/// Builds a fresh probe instance for one run.
pub type ProbeFactory = Arc<dyn Fn(&ProbeContext) -> Box<dyn Probe> + Send + Sync>;

/// Stable probe key to factory.
#[derive(Clone, Default)]
pub struct ProbeRegistry {
    factories: HashMap<String, ProbeFactory>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in probe under its key.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("database", |ctx| Box::new(DatabaseProbe::new(ctx)));
        registry.register("cache", |ctx| Box::new(CacheProbe::new(ctx)));
        registry.register("scheduler", |ctx| Box::new(SchedulerProbe::new(ctx)));
        registry.register("external_import", |ctx| Box::new(ExternalImportProbe::new(ctx)));
        registry.register("solr", |ctx| Box::new(SolrProbe::new(ctx)));
        registry.register("solr_core", |ctx| Box::new(SolrCoreProbe::new(ctx)));
        registry.register("mailjet", |ctx| Box::new(MailjetProbe::new(ctx)));
        registry.register("saml_metadata", |ctx| Box::new(SamlMetadataProbe::new(ctx)));
        registry.register("dummy", |ctx| Box::new(DummyProbe::new(ctx)));
        registry
    }

    /// Register a factory. An existing key is replaced.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ProbeContext) -> Box<dyn Probe> + Send + Sync + 'static,
    {
        self.factories.insert(key.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Create a new probe instance, `None` for unknown keys.
    pub fn create(&self, key: &str, context: &ProbeContext) -> Option<Box<dyn Probe>> {
        self.factories.get(key).map(|factory| factory(context))
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// Renderer identifier to output.
#[derive(Clone, Default)]
pub struct OutputRegistry {
    outputs: HashMap<String, Arc<dyn Output>>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `html`, `json` and `dummy` renderers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("html", HtmlOutput::new());
        registry.register("json", JsonOutput::new());
        registry.register("dummy", DummyOutput);
        registry
    }

    pub fn register(&mut self, identifier: impl Into<String>, output: impl Output + 'static) -> &mut Self {
        self.outputs.insert(identifier.into(), Arc::new(output));
        self
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.outputs.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<Arc<dyn Output>> {
        self.outputs.get(identifier).cloned()
    }
}
