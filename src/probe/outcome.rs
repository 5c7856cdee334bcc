//! Per-probe outcome types.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

/// Outcome of a probe, a message or the whole healthcheck.
///
/// `Error` dominates `Success`: the ordering is used by [`Status::worst`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl Status {
    /// Lowercase name, as used in rendered output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Combine two statuses; any error wins.
    #[inline]
    pub fn worst(self, other: Status) -> Status {
        self.max(other)
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        *self == Self::Error
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Success
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line of probe output. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeMessage {
    status: Status,
    text: String,
}

impl ProbeMessage {
    pub fn new(status: Status, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Status::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Status::Error, text)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Result of one probe run: derived status, timing and ordered messages.
///
/// The status starts as [`Status::Success`] and turns into
/// [`Status::Error`] with the first error message. It never goes back.
#[derive(Debug, Clone, Default)]
pub struct ProbeResult {
    status: Status,
    started_at: Option<DateTime<Utc>>,
    start: Option<Instant>,
    end: Option<Instant>,
    messages: Vec<ProbeMessage>,
}

impl ProbeResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn messages(&self) -> &[ProbeMessage] {
        &self.messages
    }

    /// Wall clock time the probe started, if it did.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn add_message(&mut self, message: ProbeMessage) {
        self.status = self.status.worst(message.status());
        self.messages.push(message);
    }

    pub fn add_success_message(&mut self, text: impl Into<String>) {
        self.add_message(ProbeMessage::success(text));
    }

    pub fn add_error_message(&mut self, text: impl Into<String>) {
        self.add_message(ProbeMessage::error(text));
    }

    /// Record the start time. Clears a previous end time.
    pub(crate) fn mark_started(&mut self) {
        self.started_at = Some(Utc::now());
        self.start = Some(Instant::now());
        self.end = None;
    }

    /// Record a start time taken earlier.
    pub(crate) fn mark_started_at(&mut self, start: Instant) {
        let elapsed = chrono::Duration::from_std(start.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.started_at = Some(Utc::now() - elapsed);
        self.start = Some(start);
        self.end = None;
    }

    /// Record the end time.
    pub(crate) fn mark_stopped(&mut self) {
        self.end = Some(Instant::now());
    }

    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    /// True once both start and end were recorded.
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Probe duration in seconds, rounded to four decimal places.
    ///
    /// Fails with [`Error::IncompleteTiming`] until both start and end are set.
    pub fn duration(&self) -> Result<f64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                let secs = end.saturating_duration_since(start).as_secs_f64();
                Ok((secs * 10_000.0).round() / 10_000.0)
            }
            _ => Err(Error::IncompleteTiming),
        }
    }
}
