//! SAML identity provider metadata expiry probe.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Probe, ProbeBase, ProbeContext, ProbeResult};

/// Refreshed identity provider metadata.
pub trait MetadataSource: Send + Sync {
    /// Expiry of the first metadata entry, if one can be determined.
    fn expires_at(&self) -> Option<DateTime<Utc>>;
}

/// Fails once the refreshed metadata has expired.
///
/// The expiry is read once, when the probe is created.
pub struct SamlMetadataProbe {
    base: ProbeBase,
    expires_at: Option<DateTime<Utc>>,
    tolerance_minutes: i64,
}

impl SamlMetadataProbe {
    pub const IDENTIFIER: &'static str = "SamlMetadataProbe";

    pub fn new(context: &ProbeContext) -> Self {
        Self {
            base: ProbeBase::new(Self::IDENTIFIER, "SAML metadata").with_debug(context.debug),
            expires_at: context
                .backends
                .saml_metadata
                .as_ref()
                .and_then(|source| source.expires_at()),
            tolerance_minutes: context.config.saml_tolerance_minutes,
        }
    }

    fn evaluate(&mut self, expires: DateTime<Utc>, now: DateTime<Utc>) {
        let date = expires.format("%d.%m.%Y %H:%M:%S");
        let remaining = expires - now;
        let minutes = (remaining.num_seconds().abs() as f64 / 60.0).round() as i64;

        if remaining.num_seconds() < 0 {
            self.base.error(format!(
                "Metadata expired on {}, {} minutes ago (tolerance {} minutes)",
                date, minutes, self.tolerance_minutes
            ));
        } else {
            self.base.success(format!(
                "Metadata expires on {}, in {} minutes (tolerance {} minutes)",
                date, minutes, self.tolerance_minutes
            ));
        }
    }
}

#[async_trait]
impl Probe for SamlMetadataProbe {
    fn identifier(&self) -> &str {
        self.base.identifier()
    }

    fn title(&self) -> &str {
        self.base.title()
    }

    fn use_probe(&self) -> bool {
        self.expires_at.is_some()
    }

    async fn run(&mut self) {
        self.base.start();

        match self.expires_at {
            Some(expires) => self.evaluate(expires, Utc::now()),
            None => self.base.error("Metadata expiry could not be determined"),
        }

        self.base.stop();
    }

    fn result(&self) -> &ProbeResult {
        self.base.result()
    }
}
