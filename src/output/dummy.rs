//! Skeleton renderer to start a custom one from.

use super::{Output, RenderContext};
use crate::result::HealthcheckResult;

/// Always renders an empty JSON list.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyOutput;

impl Output for DummyOutput {
    fn content_type(&self) -> &str {
        "application/json"
    }

    fn content(&self, _result: &HealthcheckResult, _context: &RenderContext) -> String {
        "[]".to_string()
    }
}
