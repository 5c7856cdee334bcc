//! Solr index queue backlog probe.

use std::sync::Arc;

use async_trait::async_trait;

use super::{BackendError, Probe, ProbeBase, ProbeContext, ProbeResult};

/// The search index queue.
#[async_trait]
pub trait IndexQueue: Send + Sync {
    /// Number of queue items with a recorded indexing error.
    async fn errored_items(&self) -> Result<u64, BackendError>;
}

/// Fails when more queue items errored than tolerated.
pub struct SolrProbe {
    base: ProbeBase,
    queue: Option<Arc<dyn IndexQueue>>,
    max_errors: u64,
}

impl SolrProbe {
    pub const IDENTIFIER: &'static str = "SolrProbe";

    pub fn new(context: &ProbeContext) -> Self {
        Self {
            base: ProbeBase::new(Self::IDENTIFIER, "Solr index queue").with_debug(context.debug),
            queue: context.backends.index_queue.clone(),
            max_errors: context.config.solr_max_error_count,
        }
    }
}

#[async_trait]
impl Probe for SolrProbe {
    fn identifier(&self) -> &str {
        self.base.identifier()
    }

    fn title(&self) -> &str {
        self.base.title()
    }

    fn use_probe(&self) -> bool {
        self.queue.is_some()
    }

    async fn run(&mut self) {
        self.base.start();

        if let Some(queue) = self.queue.clone() {
            match queue.errored_items().await {
                Ok(count) if count > self.max_errors => self.base.error(format!(
                    "{} index queue items have errors (maximum {})",
                    count, self.max_errors
                )),
                Ok(count) => self.base.success(format!(
                    "{} index queue items have errors (maximum {})",
                    count, self.max_errors
                )),
                Err(e) => self
                    .base
                    .error_with_cause("Index queue could not be read", &e),
            }
        }

        self.base.stop();
    }

    fn result(&self) -> &ProbeResult {
        self.base.result()
    }
}
