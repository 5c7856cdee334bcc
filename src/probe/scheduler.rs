//! Scheduled task probe.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{BackendError, Probe, ProbeBase, ProbeContext, ProbeResult};

/// One active (enabled, not deleted) scheduled task.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub uid: u64,
    pub description: String,
    /// Failure text of the last run; empty or `None` when it succeeded.
    pub last_execution_failure: Option<String>,
    pub next_execution: Option<DateTime<Utc>>,
}

impl ScheduledTask {
    pub fn new(uid: u64, description: impl Into<String>) -> Self {
        Self {
            uid,
            description: description.into(),
            last_execution_failure: None,
            next_execution: None,
        }
    }

    pub fn with_failure(mut self, failure: impl Into<String>) -> Self {
        self.last_execution_failure = Some(failure.into());
        self
    }

    pub fn with_next_execution(mut self, at: DateTime<Utc>) -> Self {
        self.next_execution = Some(at);
        self
    }

    fn failed(&self) -> bool {
        self.last_execution_failure
            .as_deref()
            .is_some_and(|failure| !failure.is_empty())
    }
}

/// Source of active scheduled tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn active_tasks(&self) -> Result<Vec<ScheduledTask>, BackendError>;
}

/// Reports failed and overdue scheduled tasks.
pub struct SchedulerProbe {
    base: ProbeBase,
    tasks: Option<Arc<dyn TaskRepository>>,
    max_minutes_late: i64,
}

impl SchedulerProbe {
    pub const IDENTIFIER: &'static str = "SchedulerProbe";

    pub fn new(context: &ProbeContext) -> Self {
        Self {
            base: ProbeBase::new(Self::IDENTIFIER, "Scheduler").with_debug(context.debug),
            tasks: context.backends.scheduler.clone(),
            max_minutes_late: context.config.scheduler_max_minutes_late,
        }
    }

    fn check_task(&mut self, task: &ScheduledTask, now: DateTime<Utc>) {
        if task.failed() {
            self.base.error(format!(
                "Task {} ({}) failed on its last execution",
                task.uid, task.description
            ));
            return;
        }

        let late = task
            .next_execution
            .is_some_and(|next| (now - next).num_seconds() > self.max_minutes_late * 60);

        if late {
            self.base.error(format!(
                "Task {} ({}) is more than {} minutes late",
                task.uid, task.description, self.max_minutes_late
            ));
        } else {
            self.base
                .success(format!("Task {} ({}) is working", task.uid, task.description));
        }
    }
}

#[async_trait]
impl Probe for SchedulerProbe {
    fn identifier(&self) -> &str {
        self.base.identifier()
    }

    fn title(&self) -> &str {
        self.base.title()
    }

    fn use_probe(&self) -> bool {
        self.tasks.is_some()
    }

    async fn run(&mut self) {
        self.base.start();

        if let Some(repository) = self.tasks.clone() {
            match repository.active_tasks().await {
                Ok(tasks) if tasks.is_empty() => {
                    self.base.success("No scheduler tasks configured");
                }
                Ok(tasks) => {
                    let now = Utc::now();
                    for task in &tasks {
                        self.check_task(task, now);
                    }
                }
                Err(e) => self
                    .base
                    .error_with_cause("Scheduler tasks could not be loaded", &e),
            }
        }

        self.base.stop();
    }

    fn result(&self) -> &ProbeResult {
        self.base.result()
    }
}
