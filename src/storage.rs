//! Snapshot storage for persisting the application state to disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use habitlog_core::wire::{self, ImportDiagnostic};
use habitlog_core::{AppSnapshot, WireError};

/// Filename of the local snapshot inside the data directory.
const SNAPSHOT_FILE: &str = "snapshot.json";

/// Storage for the local snapshot.
///
/// Handles loading and saving the wire document to the filesystem.
#[derive(Clone, Debug)]
pub struct SnapshotStorage {
    data_dir: PathBuf,
}

impl SnapshotStorage {
    /// Creates a new storage instance with a custom data directory.
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the full path of the snapshot file.
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    /// Checks if a snapshot exists on disk.
    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Loads the snapshot, or an empty one if none has been saved yet.
    ///
    /// Entries that fail validation are skipped; the diagnostics are
    /// returned alongside the snapshot.
    pub fn load_or_default(&self) -> Result<(AppSnapshot, Vec<ImportDiagnostic>), StorageError> {
        match load_file(&self.path())? {
            Some(loaded) => Ok(loaded),
            None => Ok((AppSnapshot::default(), Vec::new())),
        }
    }

    /// Saves the snapshot.
    ///
    /// Creates the data directory if it doesn't exist.
    pub fn save(&self, snapshot: &AppSnapshot) -> Result<(), StorageError> {
        save_file(&self.path(), snapshot)
    }
}

/// Reads a wire document. Returns `Ok(None)` if the file doesn't exist.
pub fn load_file(
    path: &Path,
) -> Result<Option<(AppSnapshot, Vec<ImportDiagnostic>)>, StorageError> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let import = wire::from_json(&contents)
                .map_err(|e| StorageError::LoadError(path.to_path_buf(), e))?;
            for diagnostic in &import.diagnostics {
                tracing::warn!("{}: {}", path.display(), diagnostic);
            }
            Ok(Some((import.snapshot, import.diagnostics)))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::IoError(path.to_path_buf(), e)),
    }
}

/// Writes a wire document, replacing the target in one rename so a crash
/// never leaves a half-written file behind.
pub fn save_file(path: &Path, snapshot: &AppSnapshot) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::IoError(parent.to_path_buf(), e))?;
    }

    let json = wire::to_json_pretty(snapshot)
        .map_err(|e| StorageError::LoadError(path.to_path_buf(), e))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| StorageError::IoError(tmp.clone(), e))?;
    fs::rename(&tmp, path).map_err(|e| StorageError::IoError(path.to_path_buf(), e))?;

    Ok(())
}

/// Errors that can occur during snapshot storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing a file.
    IoError(PathBuf, io::Error),
    /// Error encoding or decoding a snapshot document.
    LoadError(PathBuf, WireError),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StorageError::LoadError(path, e) => {
                write!(f, "Failed to load snapshot {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(_, e) => Some(e),
            StorageError::LoadError(_, e) => Some(e),
        }
    }
}
