use std::path::PathBuf;

use clap::Args;

use habitlog_core::reconcile;

use crate::storage::{self, SnapshotStorage};

/// Merge another device's snapshot file into the local snapshot
#[derive(Args)]
pub struct MergeCommand {
    /// Path to the snapshot file to merge
    pub file: PathBuf,
}

impl MergeCommand {
    pub fn run(&self, storage: &SnapshotStorage) -> Result<(), Box<dyn std::error::Error>> {
        let Some((other, diagnostics)) = storage::load_file(&self.file)? else {
            return Err(format!("File not found: {}", self.file.display()).into());
        };
        let local = if storage.exists() {
            Some(storage.load_or_default()?.0)
        } else {
            None
        };

        let merged = reconcile(local.as_ref(), Some(&other));
        storage.save(&merged)?;

        println!("Merged {}", self.file.display());
        println!("  habits: {}", merged.habits.len());
        println!("  monthly logs: {}", merged.logs.len());
        if !diagnostics.is_empty() {
            println!("  skipped entries: {}", diagnostics.len());
            for diagnostic in &diagnostics {
                println!("    {}", diagnostic);
            }
        }
        Ok(())
    }
}
