//! Skeleton probe to start a custom one from.

use async_trait::async_trait;

use super::{Probe, ProbeBase, ProbeContext, ProbeResult};

/// Always applicable, records no messages and succeeds.
pub struct DummyProbe {
    base: ProbeBase,
}

impl DummyProbe {
    pub const IDENTIFIER: &'static str = "DummyProbe";

    pub fn new(context: &ProbeContext) -> Self {
        Self {
            base: ProbeBase::new(Self::IDENTIFIER, "Dummy").with_debug(context.debug),
        }
    }
}

#[async_trait]
impl Probe for DummyProbe {
    fn identifier(&self) -> &str {
        self.base.identifier()
    }

    fn title(&self) -> &str {
        self.base.title()
    }

    async fn run(&mut self) {
        self.base.start();
        self.base.stop();
    }

    fn result(&self) -> &ProbeResult {
        self.base.result()
    }
}
