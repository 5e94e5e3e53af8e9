//! Sync CLI commands for pushing the local snapshot to the shared remote.

use clap::{Args, Subcommand};

use habitlog_core::{push, PushOutcome, SyncError};

use crate::config::Config;
use crate::remote::FileRemote;
use crate::storage::{SnapshotStorage, StorageError};

/// Sync with the shared remote snapshot
#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Debug, Subcommand)]
enum SyncSubcommand {
    /// Show sync configuration
    Status,
}

impl SyncCommand {
    pub fn run(&self, storage: &SnapshotStorage, config: &Config) -> Result<(), SyncCommandError> {
        match &self.command {
            None => self.sync(storage, config),
            Some(SyncSubcommand::Status) => {
                self.status(config);
                Ok(())
            }
        }
    }

    fn sync(&self, storage: &SnapshotStorage, config: &Config) -> Result<(), SyncCommandError> {
        let Some(remote_path) = &config.sync.remote_path else {
            return Err(SyncCommandError::NotConfigured);
        };

        println!("Syncing with {}...", remote_path.display());

        let (local, _) = storage.load_or_default()?;
        let mut remote = FileRemote::new(remote_path.clone());
        let report = push(&mut remote, local, config.sync.max_attempts)?;

        storage.save(&report.snapshot)?;

        let rounds = report.attempts;
        match report.outcome {
            PushOutcome::Accepted => println!(
                "Sync complete ({} round{}).",
                rounds,
                if rounds == 1 { "" } else { "s" }
            ),
            PushOutcome::Unchanged => println!("Already up to date."),
        }
        Ok(())
    }

    fn status(&self, config: &Config) {
        println!("Sync Configuration");
        println!("==================");
        println!();

        match &config.sync.remote_path {
            None => {
                println!("Status: Not configured");
                println!();
                println!("To enable sync, add to your config file:");
                println!();
                println!("  sync:");
                println!("    remote_path: \"/path/to/shared/habitlog.json\"");
                println!();
                println!("Or set the environment variable:");
                println!("  HABITLOG_REMOTE");
            }
            Some(path) => {
                println!("Remote:       {}", path.display());
                println!("Max attempts: {}", config.sync.max_attempts);
                println!(
                    "Remote file:  {}",
                    if path.exists() { "present" } else { "not created yet" }
                );
            }
        }
    }
}

/// Errors from sync commands
#[derive(Debug)]
pub enum SyncCommandError {
    NotConfigured,
    Storage(StorageError),
    Sync(SyncError),
}

impl std::fmt::Display for SyncCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncCommandError::NotConfigured => {
                write!(f, "Sync is not configured. Run 'habitlog sync status' for help.")
            }
            SyncCommandError::Storage(e) => write!(f, "{}", e),
            SyncCommandError::Sync(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SyncCommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncCommandError::NotConfigured => None,
            SyncCommandError::Storage(e) => Some(e),
            SyncCommandError::Sync(e) => Some(e),
        }
    }
}

impl From<StorageError> for SyncCommandError {
    fn from(e: StorageError) -> Self {
        SyncCommandError::Storage(e)
    }
}

impl From<SyncError> for SyncCommandError {
    fn from(e: SyncError) -> Self {
        SyncCommandError::Sync(e)
    }
}
