//! Cache write/read probe.

use std::sync::Arc;

use async_trait::async_trait;

use super::{BackendError, Probe, ProbeBase, ProbeContext, ProbeResult};

/// One configured cache region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRegion {
    pub name: String,
    /// The region discards everything it is given.
    pub null_backend: bool,
}

impl CacheRegion {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            null_backend: false,
        }
    }

    pub fn null(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            null_backend: true,
        }
    }
}

/// Access to the host's cache regions.
#[async_trait]
pub trait CacheManager: Send + Sync {
    fn regions(&self) -> Result<Vec<CacheRegion>, BackendError>;

    async fn set(&self, region: &str, key: &str, value: &str) -> Result<(), BackendError>;

    async fn has(&self, region: &str, key: &str) -> Result<bool, BackendError>;

    async fn remove(&self, region: &str, key: &str) -> Result<(), BackendError>;
}

/// Writes a unique entry to every region, reads it back and removes it.
pub struct CacheProbe {
    base: ProbeBase,
    cache: Option<Arc<dyn CacheManager>>,
    ignored: Vec<String>,
}

impl CacheProbe {
    pub const IDENTIFIER: &'static str = "CacheProbe";

    pub fn new(context: &ProbeContext) -> Self {
        Self {
            base: ProbeBase::new(Self::IDENTIFIER, "Cache").with_debug(context.debug),
            cache: context.backends.cache.clone(),
            ignored: context.config.cache_ignored.clone(),
        }
    }

    async fn check_region(
        cache: &dyn CacheManager,
        region: &str,
        key: &str,
    ) -> Result<bool, BackendError> {
        cache.set(region, key, "healthcheck").await?;
        if !cache.has(region, key).await? {
            return Ok(false);
        }
        cache.remove(region, key).await?;
        Ok(true)
    }
}

#[async_trait]
impl Probe for CacheProbe {
    fn identifier(&self) -> &str {
        self.base.identifier()
    }

    fn title(&self) -> &str {
        self.base.title()
    }

    fn use_probe(&self) -> bool {
        self.cache.is_some()
    }

    async fn run(&mut self) {
        self.base.start();

        if let Some(cache) = self.cache.clone() {
            match cache.regions() {
                Ok(regions) => {
                    let key = format!("healthcheck-{}", uuid::Uuid::new_v4().simple());

                    for region in regions {
                        if region.null_backend || self.ignored.contains(&region.name) {
                            continue;
                        }

                        match Self::check_region(cache.as_ref(), &region.name, &key).await {
                            Ok(true) => self
                                .base
                                .success(format!("Cache \"{}\" is writeable", region.name)),
                            Ok(false) => self
                                .base
                                .error(format!("Cache \"{}\" is not writeable", region.name)),
                            Err(e) => self.base.error_with_cause(
                                format!("Cache \"{}\" is not writeable", region.name),
                                &e,
                            ),
                        }
                    }
                }
                Err(e) => self
                    .base
                    .error_with_cause("Cache configuration could not be read", &e),
            }
        }

        self.base.stop();
    }

    fn result(&self) -> &ProbeResult {
        self.base.result()
    }
}
