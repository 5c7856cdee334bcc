//! Database connectivity probe.

use std::sync::Arc;

use async_trait::async_trait;

use super::{BackendError, Probe, ProbeBase, ProbeContext, ProbeResult};

/// Named database connections that can run a trivial query.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    /// All configured connection names, in configuration order.
    fn connection_names(&self) -> Vec<String>;

    /// Runs a cheap query (e.g. `SELECT 1`) on the named connection.
    async fn ping(&self, connection: &str) -> Result<(), BackendError>;
}

/// Checks that every configured connection answers a query.
pub struct DatabaseProbe {
    base: ProbeBase,
    pool: Option<Arc<dyn ConnectionPool>>,
}

impl DatabaseProbe {
    pub const IDENTIFIER: &'static str = "DatabaseProbe";

    pub fn new(context: &ProbeContext) -> Self {
        Self {
            base: ProbeBase::new(Self::IDENTIFIER, "Database").with_debug(context.debug),
            pool: context.backends.database.clone(),
        }
    }
}

#[async_trait]
impl Probe for DatabaseProbe {
    fn identifier(&self) -> &str {
        self.base.identifier()
    }

    fn title(&self) -> &str {
        self.base.title()
    }

    fn use_probe(&self) -> bool {
        self.pool.is_some()
    }

    async fn run(&mut self) {
        self.base.start();

        if let Some(pool) = self.pool.clone() {
            let names = pool.connection_names();
            if names.is_empty() {
                self.base.success("No database connections configured");
            }

            for name in names {
                match pool.ping(&name).await {
                    Ok(()) => self
                        .base
                        .success(format!("Connection \"{}\" is available", name)),
                    Err(e) => self
                        .base
                        .error_with_cause(format!("Connection \"{}\" is not available", name), &e),
                }
            }
        }

        self.base.stop();
    }

    fn result(&self) -> &ProbeResult {
        self.base.result()
    }
}
