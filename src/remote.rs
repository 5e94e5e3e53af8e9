//! A shared snapshot file acting as the remote store.
//!
//! Each compare-and-swap takes an exclusive advisory lock on a sibling
//! `.lock` file, loads the snapshot, applies the server-side rule via
//! [`MemoryRemote`], and writes the file back only when the payload is
//! accepted. Concurrent `sync` runs on one machine serialize on the lock.
//! Advisory locks are not honoured by every network filesystem or folder
//! syncing service; there the file remote is not atomic.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use habitlog_core::{AppSnapshot, CasOutcome, MemoryRemote, RemoteStore, SyncError};

use crate::storage;

pub struct FileRemote {
    path: PathBuf,
}

impl FileRemote {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the lock file guarding `path`.
    pub fn lock_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Blocks until the exclusive lock is held. Released when the returned
    /// file is dropped.
    fn acquire_lock(&self) -> Result<File, SyncError> {
        let lock_path = Self::lock_path(&self.path);
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| SyncError::Remote(e.to_string()))?;
        }
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| {
                SyncError::Remote(format!("Failed to open {}: {}", lock_path.display(), e))
            })?;
        lock_file.lock_exclusive().map_err(|e| {
            SyncError::Remote(format!("Failed to lock {}: {}", lock_path.display(), e))
        })?;
        Ok(lock_file)
    }
}

impl RemoteStore for FileRemote {
    fn compare_and_swap(&mut self, payload: &AppSnapshot) -> Result<CasOutcome, SyncError> {
        let _lock = self.acquire_lock()?;

        let stored = storage::load_file(&self.path)
            .map_err(|e| SyncError::Remote(e.to_string()))?
            .map(|(snapshot, _)| snapshot);

        let mut remote = MemoryRemote::with_stored(stored);
        let outcome = remote.compare_and_swap(payload)?;

        if outcome == CasOutcome::Accepted {
            storage::save_file(&self.path, payload)
                .map_err(|e| SyncError::Remote(e.to_string()))?;
        }
        Ok(outcome)
    }
}
