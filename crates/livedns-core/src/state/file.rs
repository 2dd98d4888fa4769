// # File State Store
//
// File-based implementation of StateStore.
//
// ## Purpose
//
// Keeps the last applied IP across runs so an unchanged address costs one
// HTTP request and no zone traffic.
//
// ## Crash Recovery
//
// - Atomic writes: the record is written to a temporary file and renamed over
//   the real one, so the state file is never partially written
// - Corruption detection: the JSON is validated on load
// - Recovery: a corrupt file is deleted and the sentinel is returned, which
//   makes the next run reconcile the zone again
//
// ## File Format
//
// ```json
// { "updateTime": "2025-01-09T12:00:00.000Z", "ip": "203.0.113.7" }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::state_store::{IpRecord, StateStore};

/// File-based IP state store
///
/// # Example
///
/// ```rust,no_run
/// use livedns_core::state::FileStateStore;
/// use livedns_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() {
///     let store = FileStateStore::new("/home/alice/.liveDnsUpdater/.iprecord");
///
///     if store.save("203.0.113.7").await {
///         let record = store.load().await;
///         assert_eq!(record.ip, "203.0.113.7");
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by `path`. Nothing is touched until the first
    /// load or save.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored record
    ///
    /// - `Ok(None)`: no state file
    /// - `Err(Error::Json)`: the file exists but is corrupt
    /// - `Err(_)`: the file could not be read
    async fn read_record(&self) -> Result<Option<IpRecord>, Error> {
        if !fs::try_exists(&self.path).await? {
            tracing::debug!("State file does not exist: {}", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await?;
        let record: IpRecord = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    /// Write a record atomically
    async fn write_record(&self, record: &IpRecord) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !fs::try_exists(parent).await?
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string(record)
            .map_err(|e| Error::state_store(format!("Failed to serialize state: {}", e)))?;

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Atomic rename (temp -> actual)
        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            )));
        }

        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }

    /// Delete a corrupt state file
    async fn discard(&self) {
        match fs::remove_file(&self.path).await {
            Ok(()) => tracing::info!("Removed corrupt state file {}", self.path.display()),
            Err(e) => tracing::error!(
                "Failed to remove corrupt state file {}: {}",
                self.path.display(),
                e
            ),
        }
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> IpRecord {
        match self.read_record().await {
            Ok(Some(record)) => {
                tracing::debug!(
                    "Loaded previous IP {} (stored {})",
                    record.ip,
                    record.update_time
                );
                record
            }
            Ok(None) => IpRecord::sentinel(),
            Err(Error::Json(e)) => {
                tracing::error!(
                    "State file {} is corrupted: {}. Discarding it.",
                    self.path.display(),
                    e
                );
                self.discard().await;
                IpRecord::sentinel()
            }
            Err(e) => {
                tracing::error!(
                    "Failed to read state file {}: {}",
                    self.path.display(),
                    e
                );
                IpRecord::sentinel()
            }
        }
    }

    async fn save(&self, ip: &str) -> bool {
        match self.write_record(&IpRecord::new(ip)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to store IP state to {}: {}",
                    self.path.display(),
                    e
                );
                false
            }
        }
    }
}
