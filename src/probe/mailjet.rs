//! Mail delivery success rate probe.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::{BackendError, Probe, ProbeBase, ProbeContext, ProbeResult};

/// Window of recent emails that is evaluated.
const WINDOW_HOURS: i64 = 24;

/// Log of emails handed to the delivery service.
#[async_trait]
pub trait EmailLog: Send + Sync {
    /// Emails sent since the given time.
    async fn sent_since(&self, since: DateTime<Utc>) -> Result<u64, BackendError>;

    /// Emails with a failed delivery status sent since the given time.
    async fn failed_since(&self, since: DateTime<Utc>) -> Result<u64, BackendError>;
}

/// Checks the failure rate of emails sent in the last 24 hours.
///
/// Below the minimum sample size only a complete failure counts; above it
/// the failure rate is compared against the warning and critical
/// thresholds. Both thresholds report an error.
pub struct MailjetProbe {
    base: ProbeBase,
    log: Option<Arc<dyn EmailLog>>,
    min_sample_size: u64,
    warning_percent: f64,
    critical_percent: f64,
}

impl MailjetProbe {
    pub const IDENTIFIER: &'static str = "MailjetProbe";

    pub fn new(context: &ProbeContext) -> Self {
        Self {
            base: ProbeBase::new(Self::IDENTIFIER, "Mailjet delivery success rate")
                .with_debug(context.debug),
            log: context.backends.email_log.clone(),
            min_sample_size: context.config.mail_min_sample_size,
            warning_percent: context.config.mail_warning_percent,
            critical_percent: context.config.mail_critical_percent,
        }
    }

    async fn counts(log: &dyn EmailLog) -> Result<(u64, u64), BackendError> {
        let since = Utc::now() - Duration::hours(WINDOW_HOURS);
        let total = log.sent_since(since).await?;
        if total == 0 {
            return Ok((0, 0));
        }
        let failed = log.failed_since(since).await?;
        Ok((total, failed.min(total)))
    }

    fn evaluate(&mut self, total: u64, failed: u64) {
        let delivered = total - failed;

        if total == 0 {
            self.base.success("No emails sent in the last 24 hours");
            return;
        }

        if total < self.min_sample_size {
            if failed == total {
                self.base
                    .error(format!("All {} emails of the last 24 hours failed", total));
            } else {
                self.base.success(format!(
                    "{} of {} emails delivered in the last 24 hours",
                    delivered, total
                ));
            }
            return;
        }

        let rate = failed as f64 / total as f64 * 100.0;
        if rate >= self.critical_percent {
            self.base.error(format!(
                "Critical failure rate {:.1}% ({} of {} emails failed, threshold {}%)",
                rate, failed, total, self.critical_percent
            ));
        } else if rate >= self.warning_percent {
            self.base.error(format!(
                "Elevated failure rate {:.1}% ({} of {} emails failed, threshold {}%)",
                rate, failed, total, self.warning_percent
            ));
        } else {
            self.base.success(format!(
                "Failure rate {:.1}% ({} of {} emails delivered)",
                rate, delivered, total
            ));
        }
    }
}

#[async_trait]
impl Probe for MailjetProbe {
    fn identifier(&self) -> &str {
        self.base.identifier()
    }

    fn title(&self) -> &str {
        self.base.title()
    }

    fn use_probe(&self) -> bool {
        self.log.is_some()
    }

    async fn run(&mut self) {
        self.base.start();

        if let Some(log) = self.log.clone() {
            match Self::counts(log.as_ref()).await {
                Ok((total, failed)) => self.evaluate(total, failed),
                Err(e) => self.base.error_with_cause("Email log could not be read", &e),
            }
        }

        self.base.stop();
    }

    fn result(&self) -> &ProbeResult {
        self.base.result()
    }
}
