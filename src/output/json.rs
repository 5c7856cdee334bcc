//! JSON renderer.

use serde::Serialize;
use tracing::error;

use super::{Output, RenderContext};
use crate::probe::Status;
use crate::result::HealthcheckResult;

#[derive(Serialize)]
struct Document<'a> {
    status: Status,
    probes: Vec<ProbeEntry<'a>>,
}

#[derive(Serialize)]
struct ProbeEntry<'a> {
    identifier: &'a str,
    title: &'a str,
    status: Status,
    paused: bool,
    /// Seconds; null when the probe never stopped its timer.
    duration: Option<f64>,
    messages: Vec<MessageEntry<'a>>,
}

#[derive(Serialize)]
struct MessageEntry<'a> {
    status: Status,
    text: &'a str,
}

/// `{"status": ..., "probes": [{"title", "status", "duration", "messages"}]}`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Output for JsonOutput {
    fn content_type(&self) -> &str {
        "application/json"
    }

    fn content(&self, result: &HealthcheckResult, _context: &RenderContext) -> String {
        let document = Document {
            status: result.status(),
            probes: result
                .probes()
                .iter()
                .map(|report| ProbeEntry {
                    identifier: &report.identifier,
                    title: &report.title,
                    status: report.result.status(),
                    paused: report.paused,
                    duration: report.duration(),
                    messages: report
                        .result
                        .messages()
                        .iter()
                        .map(|message| MessageEntry {
                            status: message.status(),
                            text: message.text(),
                        })
                        .collect(),
                })
                .collect(),
        };

        serde_json::to_string(&document).unwrap_or_else(|e| {
            error!(error = %e, "Failed to render JSON output");
            format!(r#"{{"status":"{}","probes":[]}}"#, result.status())
        })
    }
}
