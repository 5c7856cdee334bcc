//! The healthcheck engine: configuration checks, probe run and rendering.
//!
//! # Example
//!
//! ```rust,ignore
//! use healthcheck::healthcheck::{Healthcheck, RequestInfo};
//! use tokio_util::sync::CancellationToken;
//!
//! let engine = Healthcheck::new(&config, probes, outputs, pause_store, backends);
//! let response = engine
//!     .respond("json", &RequestInfo::default(), &CancellationToken::new())
//!     .await;
//! assert!(response.status.is_success());
//! ```

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use http::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{Config, HealthcheckConfig};
use crate::error::{Error, Result};
use crate::output::{Output, RenderContext};
use crate::pause::PauseStore;
use crate::probe::{Backends, ProbeContext};
use crate::registry::{OutputRegistry, ProbeRegistry};
use crate::result::HealthcheckResult;
use crate::runner::ProbeRunner;

/// Body shown for configuration errors outside debug mode.
const GENERIC_ERROR: &str = "The healthcheck is not configured correctly.";

/// Body shown for other request-level failures outside debug mode.
const INTERNAL_ERROR: &str = "The healthcheck could not be completed.";

/// Caller details the engine may render.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub client_ip: Option<IpAddr>,
}

/// Transport independent response.
#[derive(Debug, Clone)]
pub struct HealthcheckResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: String,
}

/// Engine facade shared by every request.
pub struct Healthcheck {
    config: Arc<HealthcheckConfig>,
    probes: Arc<ProbeRegistry>,
    outputs: Arc<OutputRegistry>,
    runner: ProbeRunner,
}

impl Healthcheck {
    pub fn new(
        config: &Config,
        probes: ProbeRegistry,
        outputs: OutputRegistry,
        pause_store: Arc<dyn PauseStore>,
        backends: Backends,
    ) -> Self {
        let probes = Arc::new(probes);
        let context = ProbeContext::new(config.probes.clone(), backends)
            .with_debug(config.healthcheck.debug);
        let runner = ProbeRunner::new(
            Arc::clone(&probes),
            pause_store,
            context,
            config.runner.clone(),
        );

        Self {
            config: Arc::new(config.healthcheck.clone()),
            probes,
            outputs: Arc::new(outputs),
            runner,
        }
    }

    pub fn config(&self) -> &HealthcheckConfig {
        &self.config
    }

    pub fn pause_store(&self) -> &Arc<dyn PauseStore> {
        self.runner.pause_store()
    }

    /// Registered probe keys, sorted.
    pub fn registered_probes(&self) -> Vec<&str> {
        self.probes.keys()
    }

    /// Configured keys whose probe would currently run. Unknown keys are
    /// left out.
    pub fn applicable_probes(&self) -> Vec<&str> {
        let context = self.runner.context();
        self.config
            .probes
            .iter()
            .filter(|key| {
                self.probes
                    .create(key, context)
                    .is_some_and(|probe| probe.use_probe())
            })
            .map(String::as_str)
            .collect()
    }

    /// Every configured probe key must be registered.
    pub fn check_probes(&self) -> Result<()> {
        if self.config.probes.is_empty() {
            return Err(Error::NoProbes);
        }

        match self.config.probes.iter().find(|key| !self.probes.contains(key)) {
            Some(key) => Err(Error::UnknownProbe(key.clone())),
            None => Ok(()),
        }
    }

    /// Every configured renderer must be registered and `format` must be
    /// one of the configured format names. Returns the selected renderer.
    pub fn check_outputs(&self, format: &str) -> Result<Arc<dyn Output>> {
        if self.config.outputs.is_empty() {
            return Err(Error::NoOutputs);
        }

        if let Some((_, identifier)) = self
            .config
            .outputs
            .iter()
            .find(|(_, identifier)| !self.outputs.contains(identifier))
        {
            return Err(Error::UnknownOutput(identifier.clone()));
        }

        self.config
            .output_for(format)
            .and_then(|identifier| self.outputs.get(identifier))
            .ok_or_else(|| Error::FormatNotPresent(format.to_string()))
    }

    /// Run all configured probes.
    pub async fn run_probes(&self, cancel: &CancellationToken) -> Result<HealthcheckResult> {
        self.runner.run_probes(&self.config.probes, cancel).await
    }

    /// Check configuration, run probes and render the result in `format`.
    pub async fn respond(
        &self,
        format: &str,
        request: &RequestInfo,
        cancel: &CancellationToken,
    ) -> HealthcheckResponse {
        let format = format.to_lowercase();

        let output = match self.check_probes().and_then(|_| self.check_outputs(&format)) {
            Ok(output) => output,
            Err(e) => return self.error_response(&e),
        };

        let result = match self.run_probes(cancel).await {
            Ok(result) => result,
            Err(e) => return self.error_response(&e),
        };

        let context = RenderContext::from_config(&self.config)
            .with_client_ip(request.client_ip)
            .with_generated_at(Utc::now());

        let status = if result.is_success() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        debug!(
            status = %result.status(),
            probes = result.probes().len(),
            format = %format,
            "Healthcheck completed"
        );

        HealthcheckResponse {
            status,
            content_type: output.content_type().to_string(),
            body: output.content(&result, &context),
        }
    }

    /// Request-level error response. Details are only shown in debug mode.
    ///
    /// Configuration errors map to 503, anything else to 500.
    pub fn error_response(&self, error: &Error) -> HealthcheckResponse {
        warn!(error = %error, "Healthcheck not executed");

        let (status, generic) = if error.is_configuration() {
            (StatusCode::SERVICE_UNAVAILABLE, GENERIC_ERROR)
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        };

        let body = if self.config.debug {
            error.to_string()
        } else {
            generic.to_string()
        };

        HealthcheckResponse {
            status,
            content_type: "text/plain; charset=utf-8".to_string(),
            body,
        }
    }
}
