//! In-memory backends and scripted probes for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    BackendError, CacheManager, CacheRegion, ConnectionPool, CorePinger, EmailLog, ImportLog,
    ImportLogEntry, IndexQueue, MetadataSource, Probe, ProbeBase, ProbeResult, ScheduledTask,
    TaskRepository,
};

pub struct FakePool {
    names: Vec<String>,
    failing: HashSet<String>,
}

impl FakePool {
    pub fn healthy(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            failing: HashSet::new(),
        }
    }

    pub fn with_failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }
}

#[async_trait]
impl ConnectionPool for FakePool {
    fn connection_names(&self) -> Vec<String> {
        self.names.clone()
    }

    async fn ping(&self, connection: &str) -> Result<(), BackendError> {
        if self.failing.contains(connection) {
            Err("connection refused".into())
        } else {
            Ok(())
        }
    }
}

pub struct FakeCache {
    regions: Vec<CacheRegion>,
    read_only: HashSet<String>,
    entries: Mutex<HashSet<(String, String)>>,
}

impl FakeCache {
    pub fn new(regions: Vec<CacheRegion>) -> Self {
        Self {
            regions,
            read_only: HashSet::new(),
            entries: Mutex::new(HashSet::new()),
        }
    }

    /// Writes to this region are silently dropped.
    pub fn with_read_only(mut self, region: &str) -> Self {
        self.read_only.insert(region.to_string());
        self
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl CacheManager for FakeCache {
    fn regions(&self) -> Result<Vec<CacheRegion>, BackendError> {
        Ok(self.regions.clone())
    }

    async fn set(&self, region: &str, key: &str, _value: &str) -> Result<(), BackendError> {
        if !self.read_only.contains(region) {
            self.entries
                .lock()
                .unwrap()
                .insert((region.to_string(), key.to_string()));
        }
        Ok(())
    }

    async fn has(&self, region: &str, key: &str) -> Result<bool, BackendError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .contains(&(region.to_string(), key.to_string())))
    }

    async fn remove(&self, region: &str, key: &str) -> Result<(), BackendError> {
        self.entries
            .lock()
            .unwrap()
            .remove(&(region.to_string(), key.to_string()));
        Ok(())
    }
}

pub struct FakeTasks(Result<Vec<ScheduledTask>, BackendError>);

impl FakeTasks {
    pub fn new(tasks: Vec<ScheduledTask>) -> Self {
        Self(Ok(tasks))
    }

    pub fn failing(message: &str) -> Self {
        Self(Err(message.into()))
    }
}

#[async_trait]
impl TaskRepository for FakeTasks {
    async fn active_tasks(&self) -> Result<Vec<ScheduledTask>, BackendError> {
        self.0.clone()
    }
}

pub struct FakeImportLog(Option<ImportLogEntry>);

impl FakeImportLog {
    pub fn entry(status: &str, configuration: &str, message: &str) -> Self {
        Self(Some(ImportLogEntry {
            status: status.to_string(),
            configuration: configuration.to_string(),
            message: message.to_string(),
        }))
    }

    pub fn empty() -> Self {
        Self(None)
    }
}

#[async_trait]
impl ImportLog for FakeImportLog {
    async fn latest_entry(&self) -> Result<Option<ImportLogEntry>, BackendError> {
        Ok(self.0.clone())
    }
}

pub struct FakeQueue(Option<u64>);

impl FakeQueue {
    pub fn new(errored: u64) -> Self {
        Self(Some(errored))
    }

    pub fn failing() -> Self {
        Self(None)
    }
}

#[async_trait]
impl IndexQueue for FakeQueue {
    async fn errored_items(&self) -> Result<u64, BackendError> {
        self.0.ok_or_else(|| "index queue table missing".into())
    }
}

pub struct FakeEmailLog(Option<(u64, u64)>);

impl FakeEmailLog {
    pub fn new(sent: u64, failed: u64) -> Self {
        Self(Some((sent, failed)))
    }

    pub fn failing() -> Self {
        Self(None)
    }
}

#[async_trait]
impl EmailLog for FakeEmailLog {
    async fn sent_since(&self, _since: DateTime<Utc>) -> Result<u64, BackendError> {
        self.0.map(|(sent, _)| sent).ok_or_else(|| "email log missing".into())
    }

    async fn failed_since(&self, _since: DateTime<Utc>) -> Result<u64, BackendError> {
        self.0.map(|(_, failed)| failed).ok_or_else(|| "email log missing".into())
    }
}

pub struct FakeMetadata(pub Option<DateTime<Utc>>);

impl MetadataSource for FakeMetadata {
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.0
    }
}

/// Answers pings from a fixed table. Unknown URLs fail to connect.
#[derive(Default)]
pub struct FakePinger {
    responses: HashMap<String, Option<String>>,
}

impl FakePinger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, status: Option<&str>) -> Self {
        self.responses
            .insert(url.to_string(), status.map(str::to_string));
        self
    }
}

#[async_trait]
impl CorePinger for FakePinger {
    async fn ping(&self, url: &str, _timeout: Duration) -> Result<Option<String>, BackendError> {
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| BackendError::new(format!("connection to {} refused", url)))
    }
}

/// What a [`ScriptedProbe`] does when run.
#[derive(Clone, Default)]
pub enum Script {
    #[default]
    Succeed,
    Fail,
    Sleep(Duration),
    Panic,
    /// Records a message but never stops the timer.
    ForgetStop,
}

/// Probe with fixed behavior for runner tests.
pub struct ScriptedProbe {
    base: ProbeBase,
    script: Script,
    applicable: bool,
}

impl ScriptedProbe {
    pub fn new(identifier: &str, script: Script) -> Self {
        Self {
            base: ProbeBase::new(identifier, identifier.to_uppercase()),
            script,
            applicable: true,
        }
    }

    pub fn not_applicable(mut self) -> Self {
        self.applicable = false;
        self
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    fn identifier(&self) -> &str {
        self.base.identifier()
    }

    fn title(&self) -> &str {
        self.base.title()
    }

    fn use_probe(&self) -> bool {
        self.applicable
    }

    async fn run(&mut self) {
        self.base.start();
        match self.script.clone() {
            Script::Succeed => self.base.success("ok"),
            Script::Fail => self.base.error("broken"),
            Script::Sleep(duration) => {
                tokio::time::sleep(duration).await;
                self.base.success("slept");
            }
            Script::Panic => panic!("probe exploded"),
            Script::ForgetStop => {
                self.base.success("ok");
                return;
            }
        }
        self.base.stop();
    }

    fn result(&self) -> &ProbeResult {
        self.base.result()
    }
}
