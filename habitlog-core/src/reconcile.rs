//! Merging two complete snapshots.
//!
//! - Logs go through [`merge_logs`].
//! - Habits are matched by id. A habit on one side only is kept. A habit on
//!   both sides takes the record from the snapshot with the greater
//!   `last_modified` (the first argument wins ties), but the `deleted` and
//!   `purged` flags are OR-ed so a tombstone is never lost.
//! - Day entries are merged per (date, habit) key with the same precedence.
//! - Habits purged on either side have their logs and day entries pruned
//!   from the result, which makes a hard delete converge like any other
//!   tombstone.
//! - The result's clock is strictly greater than both inputs.

use std::collections::BTreeMap;

use crate::clock;
use crate::merge::merge_logs;
use crate::models::Habit;
use crate::snapshot::{AppSnapshot, DayEntries};

/// Reconciles two snapshots using the wall clock for the new timestamp.
pub fn reconcile(a: Option<&AppSnapshot>, b: Option<&AppSnapshot>) -> AppSnapshot {
    reconcile_at(a, b, clock::wall_clock_ms())
}

/// Reconciles two snapshots at wall time `now`.
///
/// A missing side acts as the identity: the other side is returned
/// unchanged.
pub fn reconcile_at(a: Option<&AppSnapshot>, b: Option<&AppSnapshot>, now: u64) -> AppSnapshot {
    match (a, b) {
        (Some(a), Some(b)) => merge_snapshots(a, b, now),
        (Some(only), None) | (None, Some(only)) => only.clone(),
        (None, None) => AppSnapshot::default(),
    }
}

fn merge_snapshots(a: &AppSnapshot, b: &AppSnapshot, now: u64) -> AppSnapshot {
    let b_newer = b.last_modified > a.last_modified;

    let mut merged = AppSnapshot {
        habits: merge_habits(&a.habits, &b.habits, b_newer),
        days: merge_days(&a.days, &b.days, b_newer),
        logs: merge_logs(&a.logs, &b.logs),
        last_modified: clock::next_tick(a.last_modified.max(b.last_modified), now),
    };

    let purged: Vec<String> = merged
        .habits
        .iter()
        .filter(|h| h.purged)
        .map(|h| h.id.clone())
        .collect();
    for habit_id in &purged {
        let removed = merged.prune_habit_data(habit_id);
        if removed > 0 {
            tracing::debug!("Pruned {} block(s) of purged habit {}", removed, habit_id);
        }
    }

    tracing::debug!(
        "Reconciled snapshots {} and {} into {}",
        a.last_modified,
        b.last_modified,
        merged.last_modified
    );
    merged
}

fn merge_habits(ours: &[Habit], theirs: &[Habit], theirs_newer: bool) -> Vec<Habit> {
    let mut merged: Vec<Habit> = ours
        .iter()
        .map(|habit| match theirs.iter().find(|h| h.id == habit.id) {
            Some(other) => merge_habit(habit, other, theirs_newer),
            None => habit.clone(),
        })
        .collect();

    for habit in theirs {
        if !ours.iter().any(|h| h.id == habit.id) {
            merged.push(habit.clone());
        }
    }
    merged
}

fn merge_habit(ours: &Habit, theirs: &Habit, theirs_newer: bool) -> Habit {
    let mut winner = if theirs_newer {
        theirs.clone()
    } else {
        ours.clone()
    };
    winner.deleted = ours.deleted || theirs.deleted;
    winner.purged = ours.purged || theirs.purged;
    winner
}

fn merge_days(ours: &DayEntries, theirs: &DayEntries, theirs_newer: bool) -> DayEntries {
    let mut merged = ours.clone();
    for (date, entries) in theirs {
        let day = merged.entry(*date).or_insert_with(BTreeMap::new);
        for (habit_id, entry) in entries {
            if theirs_newer || !day.contains_key(habit_id) {
                day.insert(habit_id.clone(), entry.clone());
            }
        }
    }
    merged
}
