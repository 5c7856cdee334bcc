//! Pause flags for probes.
//!
//! A paused probe still runs and is still shown, but its outcome no longer
//! decides the overall status. Flags are keyed by probe identifier and
//! survive across requests.

use std::collections::{BTreeSet, HashSet};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{Error, Result};

/// Storage for pause flags.
#[async_trait]
pub trait PauseStore: Send + Sync {
    /// Returns true if the probe is paused. Lookup failures count as not paused.
    async fn is_paused(&self, identifier: &str) -> bool;

    /// Pauses the probe. Pausing twice is not an error.
    async fn pause(&self, identifier: &str) -> Result<()>;

    /// Removes every pause flag of the probe. Returns false if there was none.
    async fn resume(&self, identifier: &str) -> Result<bool>;
}

/// Process-local pause flags.
#[derive(Debug, Default)]
pub struct MemoryPauseStore {
    paused: RwLock<HashSet<String>>,
}

impl MemoryPauseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PauseStore for MemoryPauseStore {
    async fn is_paused(&self, identifier: &str) -> bool {
        self.paused
            .read()
            .map(|paused| paused.contains(identifier))
            .unwrap_or(false)
    }

    async fn pause(&self, identifier: &str) -> Result<()> {
        let mut paused = self
            .paused
            .write()
            .map_err(|_| Error::Custom("pause store lock poisoned".into()))?;
        paused.insert(identifier.to_string());
        Ok(())
    }

    async fn resume(&self, identifier: &str) -> Result<bool> {
        let mut paused = self
            .paused
            .write()
            .map_err(|_| Error::Custom("pause store lock poisoned".into()))?;
        Ok(paused.remove(identifier))
    }
}

/// Pause flags kept in a JSON array of identifiers.
///
/// The file is read on every lookup, so edits by other processes sharing
/// it are picked up. Writes from this process are serialized.
#[derive(Debug)]
pub struct FilePauseStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePauseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<BTreeSet<String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeSet::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                Error::Custom(format!(
                    "pause file {} is not a JSON list: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeSet::new()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn store(&self, paused: &BTreeSet<String>) -> Result<()> {
        let json = serde_json::to_vec_pretty(paused)
            .map_err(|e| Error::Custom(format!("failed to encode pause file: {}", e)))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl PauseStore for FilePauseStore {
    async fn is_paused(&self, identifier: &str) -> bool {
        match self.load().await {
            Ok(paused) => paused.contains(identifier),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read pause file");
                false
            }
        }
    }

    async fn pause(&self, identifier: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut paused = self.load().await?;
        if paused.insert(identifier.to_string()) {
            self.store(&paused).await?;
        }
        Ok(())
    }

    async fn resume(&self, identifier: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut paused = self.load().await?;
        if !paused.remove(identifier) {
            return Ok(false);
        }
        self.store(&paused).await?;
        Ok(true)
    }
}
