//! Client side of the compare-and-swap reconciliation protocol.
//!
//! A remote store keeps one snapshot and compares the incoming
//! `last_modified` against the stored one:
//!
//! - strictly newer: the payload replaces the stored snapshot;
//! - equal and identical: nothing to do;
//! - otherwise: conflict, and the stored snapshot is returned.
//!
//! [`push`] resolves conflicts by reconciling locally (which strictly
//! advances the clock) and resubmitting.

use crate::error::SyncError;
use crate::reconcile::reconcile;
use crate::snapshot::AppSnapshot;

/// Outcome of one compare-and-swap attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CasOutcome {
    Accepted,
    Unchanged,
    Conflict(Box<AppSnapshot>),
}

/// A store that can atomically compare-and-swap a snapshot.
pub trait RemoteStore {
    fn compare_and_swap(&mut self, payload: &AppSnapshot) -> Result<CasOutcome, SyncError>;
}

/// In-memory remote applying the server-side rule.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    stored: Option<AppSnapshot>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stored(stored: Option<AppSnapshot>) -> Self {
        Self { stored }
    }

    pub fn stored(&self) -> Option<&AppSnapshot> {
        self.stored.as_ref()
    }

    pub fn into_stored(self) -> Option<AppSnapshot> {
        self.stored
    }
}

impl RemoteStore for MemoryRemote {
    fn compare_and_swap(&mut self, payload: &AppSnapshot) -> Result<CasOutcome, SyncError> {
        let outcome = match &self.stored {
            None => CasOutcome::Accepted,
            Some(stored) if payload.last_modified > stored.last_modified => CasOutcome::Accepted,
            Some(stored) if payload.last_modified == stored.last_modified && payload == stored => {
                CasOutcome::Unchanged
            }
            Some(stored) => CasOutcome::Conflict(Box::new(stored.clone())),
        };
        if outcome == CasOutcome::Accepted {
            self.stored = Some(payload.clone());
        }
        Ok(outcome)
    }
}

/// How a push finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Accepted,
    Unchanged,
}

/// Result of a successful push.
#[derive(Debug, Clone)]
pub struct PushReport {
    /// The snapshot the remote now holds; the caller should adopt it.
    pub snapshot: AppSnapshot,
    pub outcome: PushOutcome,
    pub attempts: u32,
}

/// Pushes `local` to `remote`, merging and retrying on conflict.
///
/// The remote is always contacted at least once, even if `max_attempts` is 0.
pub fn push<R>(remote: &mut R, local: AppSnapshot, max_attempts: u32) -> Result<PushReport, SyncError>
where
    R: RemoteStore + ?Sized,
{
    let max_attempts = max_attempts.max(1);
    let mut current = local;
    for attempt in 1..=max_attempts {
        match remote.compare_and_swap(&current)? {
            CasOutcome::Accepted => {
                tracing::info!(
                    "Remote accepted snapshot {} (attempt {})",
                    current.last_modified,
                    attempt
                );
                return Ok(PushReport {
                    snapshot: current,
                    outcome: PushOutcome::Accepted,
                    attempts: attempt,
                });
            }
            CasOutcome::Unchanged => {
                tracing::info!("Remote already up to date at {}", current.last_modified);
                return Ok(PushReport {
                    snapshot: current,
                    outcome: PushOutcome::Unchanged,
                    attempts: attempt,
                });
            }
            CasOutcome::Conflict(server) => {
                tracing::info!(
                    "Conflict: remote at {}, local at {}; merging",
                    server.last_modified,
                    current.last_modified
                );
                current = reconcile(Some(&current), Some(&server));
            }
        }
    }
    Err(SyncError::TooManyConflicts(max_attempts))
}
