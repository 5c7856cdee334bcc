//! Probe execution.
//!
//! The runner instantiates a fresh probe per configured key, skips probes
//! that do not apply, runs the rest and collects them into a
//! [`HealthcheckResult`] in configured order.
//!
//! Two modes are supported:
//!
//! - **Sequential** (default): one probe after the other. Cancellation is
//!   checked between probes; a running probe is allowed to finish.
//! - **Concurrent**: one task per probe, bounded by a semaphore, each with
//!   its own timeout. Results are put back into configured order.
//!
//! A probe that panics, or times out, is reported as an error result of
//! that probe. It never fails the request.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{ExecutionMode, RunnerConfig};
use crate::error::{Error, Result};
use crate::pause::PauseStore;
use crate::probe::{Probe, ProbeContext, ProbeResult};
use crate::registry::ProbeRegistry;
use crate::result::{HealthcheckResult, ProbeReport};

/// Runs configured probes and aggregates their results.
#[derive(Clone)]
pub struct ProbeRunner {
    registry: Arc<ProbeRegistry>,
    pause_store: Arc<dyn PauseStore>,
    context: ProbeContext,
    config: RunnerConfig,
}

impl ProbeRunner {
    pub fn new(
        registry: Arc<ProbeRegistry>,
        pause_store: Arc<dyn PauseStore>,
        context: ProbeContext,
        config: RunnerConfig,
    ) -> Self {
        Self {
            registry,
            pause_store,
            context,
            config,
        }
    }

    pub fn pause_store(&self) -> &Arc<dyn PauseStore> {
        &self.pause_store
    }

    pub fn context(&self) -> &ProbeContext {
        &self.context
    }

    /// Run the probes named by `keys`, in that order.
    ///
    /// Fails with [`Error::UnknownProbe`] before anything runs if a key is
    /// not registered, and with [`Error::Cancelled`] if `cancel` fires.
    pub async fn run_probes(
        &self,
        keys: &[String],
        cancel: &CancellationToken,
    ) -> Result<HealthcheckResult> {
        let mut probes = Vec::with_capacity(keys.len());
        for key in keys {
            let probe = self
                .registry
                .create(key, &self.context)
                .ok_or_else(|| Error::UnknownProbe(key.clone()))?;

            if probe.use_probe() {
                probes.push(probe);
            } else {
                debug!(probe = %key, "Probe not applicable, skipped");
            }
        }

        let reports = match self.config.mode {
            ExecutionMode::Sequential => self.run_sequential(probes, cancel).await?,
            ExecutionMode::Concurrent => self.run_concurrent(probes, cancel).await?,
        };

        let mut result = HealthcheckResult::new();
        for report in reports {
            result.add_probe(report);
            result.update_status();
        }

        Ok(result)
    }

    async fn run_sequential(
        &self,
        probes: Vec<Box<dyn Probe>>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProbeReport>> {
        let mut reports = Vec::with_capacity(probes.len());

        for probe in probes {
            if cancel.is_cancelled() {
                debug!("Healthcheck cancelled, remaining probes skipped");
                return Err(Error::Cancelled);
            }

            let report = execute(probe).await;
            reports.push(self.finish(report).await);
        }

        Ok(reports)
    }

    async fn run_concurrent(
        &self,
        probes: Vec<Box<dyn Probe>>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProbeReport>> {
        let semaphore = Arc::new(Semaphore::new(self.config.worker_count().max(1)));
        let identities: Vec<(String, String)> = probes
            .iter()
            .map(|p| (p.identifier().to_string(), p.title().to_string()))
            .collect();
        let mut slots: Vec<Option<ProbeReport>> = vec![None; probes.len()];
        let mut tasks = JoinSet::new();

        for (index, probe) in probes.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let timeout = self.config.probe_timeout;

            tasks.spawn(async move {
                let _permit = tokio::select! {
                    permit = semaphore.acquire_owned() => permit.ok(),
                    _ = cancel.cancelled() => return (index, None),
                };

                tokio::select! {
                    report = execute_with_timeout(probe, timeout) => (index, Some(report)),
                    _ = cancel.cancelled() => (index, None),
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Some(report))) => slots[index] = Some(report),
                Ok((_, None)) => {}
                Err(e) => warn!(error = %e, "Probe task failed"),
            }
        }

        if cancel.is_cancelled() {
            debug!("Healthcheck cancelled, in-flight probes dropped");
            return Err(Error::Cancelled);
        }

        let mut reports = Vec::with_capacity(slots.len());
        for (slot, (identifier, title)) in slots.into_iter().zip(identities) {
            let report = slot.unwrap_or_else(|| {
                let mut result = ProbeResult::new();
                result.add_error_message("Probe did not complete");
                ProbeReport::new(identifier, title, result)
            });
            reports.push(self.finish(report).await);
        }

        Ok(reports)
    }

    /// Attach the pause flag and log the outcome.
    async fn finish(&self, report: ProbeReport) -> ProbeReport {
        let paused = self.pause_store.is_paused(&report.identifier).await;

        if !report.result.is_complete() {
            warn!(probe = %report.identifier, "Probe did not stop its timer, duration unknown");
        }

        debug!(
            probe = %report.identifier,
            status = %report.result.status(),
            duration_ms = report.duration().map(|d| (d * 1000.0) as u64),
            paused,
            "Probe finished"
        );

        report.with_paused(paused)
    }
}

/// Run one probe. A panic becomes an error message of that probe.
async fn execute(mut probe: Box<dyn Probe>) -> ProbeReport {
    let outcome = AssertUnwindSafe(probe.run()).catch_unwind().await;

    let mut result = probe.result().clone();
    if let Err(panic) = outcome {
        let reason = panic_message(panic.as_ref());
        warn!(probe = %probe.identifier(), reason = %reason, "Probe panicked");

        result.add_error_message(format!("Probe failed unexpectedly: {}", reason));
        if result.is_started() && !result.is_complete() {
            result.mark_stopped();
        }
    }

    ProbeReport::new(probe.identifier(), probe.title(), result)
}

async fn execute_with_timeout(probe: Box<dyn Probe>, timeout: Option<Duration>) -> ProbeReport {
    let Some(limit) = timeout else {
        return execute(probe).await;
    };

    let identifier = probe.identifier().to_string();
    let title = probe.title().to_string();
    let started = Instant::now();

    match tokio::time::timeout(limit, execute(probe)).await {
        Ok(report) => report,
        Err(_) => {
            warn!(probe = %identifier, timeout_ms = limit.as_millis() as u64, "Probe timed out");

            let mut result = ProbeResult::new();
            result.mark_started_at(started);
            result.add_error_message(format!(
                "Probe did not finish within {:.1} seconds",
                limit.as_secs_f64()
            ));
            result.mark_stopped();
            ProbeReport::new(identifier, title, result)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
