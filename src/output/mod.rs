//! Renderers for a [`HealthcheckResult`].
//!
//! An output turns the aggregate into a response body. Renderers are looked
//! up by identifier in the [`OutputRegistry`](crate::registry::OutputRegistry)
//! and selected per request through the configured format name.
//!
//! | Identifier | Renderer | Content type |
//! |------------|----------|--------------|
//! | `html` | [`HtmlOutput`] | `text/html` |
//! | `json` | [`JsonOutput`] | `application/json` |
//! | `dummy` | [`DummyOutput`] | `application/json` |

mod dummy;
mod html;
mod json;

use std::net::IpAddr;

use chrono::{DateTime, Utc};

use crate::config::HealthcheckConfig;
use crate::result::HealthcheckResult;

pub use dummy::DummyOutput;
pub use html::HtmlOutput;
pub use json::JsonOutput;

/// Renders a healthcheck result.
///
/// Rendering never fails the request: on internal errors an output returns
/// a minimal valid payload and logs the problem.
pub trait Output: Send + Sync {
    /// Value of the `Content-Type` response header.
    fn content_type(&self) -> &str;

    /// Render the response body.
    fn content(&self, result: &HealthcheckResult, context: &RenderContext) -> String;
}

/// Request and branding information available to outputs.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub site_name: String,
    pub generated_at: Option<DateTime<Utc>>,
    pub client_ip: Option<IpAddr>,
    /// Show timestamp and caller IP.
    pub additional_info: bool,
    pub logo: Option<String>,
    pub background: Option<String>,
}

impl RenderContext {
    pub fn from_config(config: &HealthcheckConfig) -> Self {
        Self {
            site_name: config.site_name.clone(),
            generated_at: None,
            client_ip: None,
            additional_info: config.additional_info,
            logo: config.html_logo.clone(),
            background: config.html_background.clone(),
        }
    }

    pub fn with_client_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.client_ip = ip;
        self
    }

    pub fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }
}
