//! External import log probe.

use std::sync::Arc;

use async_trait::async_trait;

use super::{BackendError, Probe, ProbeBase, ProbeContext, ProbeResult};

/// Latest entry of the import log.
#[derive(Debug, Clone)]
pub struct ImportLogEntry {
    /// `"0"` means the import succeeded.
    pub status: String,
    pub configuration: String,
    pub message: String,
}

/// Read access to the import log.
#[async_trait]
pub trait ImportLog: Send + Sync {
    /// Most recent log entry by creation date, if any.
    async fn latest_entry(&self) -> Result<Option<ImportLogEntry>, BackendError>;
}

/// Reports the outcome of the latest external import.
pub struct ExternalImportProbe {
    base: ProbeBase,
    log: Option<Arc<dyn ImportLog>>,
}

impl ExternalImportProbe {
    pub const IDENTIFIER: &'static str = "ExternalImportProbe";

    pub fn new(context: &ProbeContext) -> Self {
        Self {
            base: ProbeBase::new(Self::IDENTIFIER, "External import").with_debug(context.debug),
            log: context.backends.import_log.clone(),
        }
    }
}

#[async_trait]
impl Probe for ExternalImportProbe {
    fn identifier(&self) -> &str {
        self.base.identifier()
    }

    fn title(&self) -> &str {
        self.base.title()
    }

    fn use_probe(&self) -> bool {
        self.log.is_some()
    }

    async fn run(&mut self) {
        self.base.start();

        if let Some(log) = self.log.clone() {
            match log.latest_entry().await {
                Ok(Some(entry)) if entry.status == "0" => self.base.success(format!(
                    "Import \"{}\" succeeded: {}",
                    entry.configuration, entry.message
                )),
                Ok(Some(entry)) => self.base.error(format!(
                    "Import \"{}\" failed: {}",
                    entry.configuration, entry.message
                )),
                Ok(None) => self.base.error("No import log entry found"),
                Err(e) => self
                    .base
                    .error_with_cause("Import log could not be read", &e),
            }
        }

        self.base.stop();
    }

    fn result(&self) -> &ProbeResult {
        self.base.result()
    }
}
