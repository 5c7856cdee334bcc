//! Aggregate result of one healthcheck run.

use crate::probe::{ProbeResult, Status};

/// One executed probe as it appears in the aggregate.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub identifier: String,
    pub title: String,
    /// Paused probes are shown but do not affect the overall status.
    pub paused: bool,
    pub result: ProbeResult,
}

impl ProbeReport {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>, result: ProbeResult) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            paused: false,
            result,
        }
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    /// Duration in seconds, `None` when the probe never stopped its timer.
    pub fn duration(&self) -> Option<f64> {
        self.result.duration().ok()
    }
}

/// Executed probes in configured order plus the derived overall status.
#[derive(Debug, Clone, Default)]
pub struct HealthcheckResult {
    status: Status,
    probes: Vec<ProbeReport>,
}

impl HealthcheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_probe(&mut self, report: ProbeReport) {
        self.probes.push(report);
    }

    /// Recompute the overall status: error as soon as one unpaused probe
    /// errored, success otherwise.
    pub fn update_status(&mut self) {
        self.status = self
            .probes
            .iter()
            .filter(|report| !report.paused)
            .map(|report| report.result.status())
            .find(Status::is_error)
            .unwrap_or(Status::Success);
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn probes(&self) -> &[ProbeReport] {
        &self.probes
    }
}
