//! The full reconcilable application state.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::clock;
use crate::models::{DayEntry, Habit, Status, TimeSlot};
use crate::store::LogStore;

/// Per-date annotations, keyed by habit id.
pub type DayEntries = BTreeMap<NaiveDate, BTreeMap<String, DayEntry>>;

/// Habit definitions, daily annotations, the log store and the logical
/// clock that orders whole-record writes.
///
/// Local edits go through the methods below, each of which advances
/// `last_modified`. Merges never mutate a snapshot; they build a new one
/// (see [`crate::reconcile`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppSnapshot {
    pub habits: Vec<Habit>,
    pub days: DayEntries,
    pub logs: LogStore,
    pub last_modified: u64,
}

impl AppSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Finds a habit by id, then by case-insensitive name among live habits.
    pub fn find_habit(&self, id_or_name: &str) -> Option<&Habit> {
        self.habit(id_or_name).or_else(|| {
            self.live_habits()
                .find(|h| h.name.eq_ignore_ascii_case(id_or_name))
        })
    }

    pub fn live_habits(&self) -> impl Iterator<Item = &Habit> {
        self.habits.iter().filter(|h| !h.deleted)
    }

    /// Advances the logical clock for a local write at wall time `now`.
    pub fn touch(&mut self, now: u64) {
        self.last_modified = clock::next_tick(self.last_modified, now);
    }

    /// Adds a habit, replacing any existing definition with the same id.
    pub fn upsert_habit(&mut self, habit: Habit, now: u64) {
        match self.habits.iter_mut().find(|h| h.id == habit.id) {
            Some(existing) => *existing = habit,
            None => self.habits.push(habit),
        }
        self.touch(now);
    }

    pub fn set_status(
        &mut self,
        habit_id: &str,
        date: NaiveDate,
        slot: TimeSlot,
        status: Status,
        now: u64,
    ) {
        self.logs.set_status(habit_id, date, slot, status);
        self.touch(now);
    }

    /// Stores a day entry; an empty entry removes the annotation.
    pub fn set_day_entry(&mut self, habit_id: &str, date: NaiveDate, entry: DayEntry, now: u64) {
        if entry.is_empty() {
            if let Some(entries) = self.days.get_mut(&date) {
                entries.remove(habit_id);
                if entries.is_empty() {
                    self.days.remove(&date);
                }
            }
        } else {
            self.days
                .entry(date)
                .or_default()
                .insert(habit_id.to_string(), entry);
        }
        self.touch(now);
    }

    pub fn day_entry(&self, habit_id: &str, date: NaiveDate) -> Option<&DayEntry> {
        self.days.get(&date).and_then(|entries| entries.get(habit_id))
    }

    /// Marks a habit deleted. Its history stays in place until purged.
    /// Returns false if the habit does not exist.
    pub fn delete_habit(&mut self, habit_id: &str, now: u64) -> bool {
        let Some(habit) = self.habits.iter_mut().find(|h| h.id == habit_id) else {
            return false;
        };
        habit.deleted = true;
        self.touch(now);
        true
    }

    /// Permanently removes a habit's history: marks the habit record purged
    /// so the removal wins every later merge, then hard-prunes its logs and
    /// annotations. Returns the number of monthly blocks removed.
    pub fn purge_habit(&mut self, habit_id: &str, now: u64) -> Option<usize> {
        let habit = self.habits.iter_mut().find(|h| h.id == habit_id)?;
        habit.deleted = true;
        habit.purged = true;
        self.touch(now);
        Some(self.prune_habit_data(habit_id))
    }

    /// Drops logs and day entries of `habit_id` without touching the clock.
    pub(crate) fn prune_habit_data(&mut self, habit_id: &str) -> usize {
        for entries in self.days.values_mut() {
            entries.remove(habit_id);
        }
        self.days.retain(|_, entries| !entries.is_empty());
        self.logs.prune_logs_for_habit(habit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_local_writes_advance_clock() {
        let mut snap = AppSnapshot::new();
        snap.upsert_habit(Habit::new("Run").with_id("h1"), 1_000);
        assert_eq!(snap.last_modified, 1_000);

        // Wall clock went backwards; the logical clock still advances.
        snap.set_status("h1", date(1), TimeSlot::Morning, Status::Done, 10);
        assert_eq!(snap.last_modified, 1_001);
    }

    #[test]
    fn test_find_habit_by_id_or_name() {
        let mut snap = AppSnapshot::new();
        snap.upsert_habit(Habit::new("Read Books").with_id("h1"), 1);
        assert_eq!(snap.find_habit("h1").unwrap().name, "Read Books");
        assert_eq!(snap.find_habit("read books").unwrap().id, "h1");
        assert!(snap.find_habit("nope").is_none());
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let mut snap = AppSnapshot::new();
        snap.upsert_habit(Habit::new("Run").with_id("h1"), 1);
        snap.upsert_habit(Habit::new("Jog").with_id("h1"), 2);
        assert_eq!(snap.habits.len(), 1);
        assert_eq!(snap.habits[0].name, "Jog");
    }

    #[test]
    fn test_day_entries() {
        let mut snap = AppSnapshot::new();
        snap.set_day_entry("h1", date(2), DayEntry::default().with_note("tired"), 1);
        assert_eq!(
            snap.day_entry("h1", date(2)).unwrap().note.as_deref(),
            Some("tired")
        );

        snap.set_day_entry("h1", date(2), DayEntry::default(), 2);
        assert!(snap.day_entry("h1", date(2)).is_none());
        assert!(snap.days.is_empty());
    }

    #[test]
    fn test_delete_habit_keeps_logs() {
        let mut snap = AppSnapshot::new();
        snap.upsert_habit(Habit::new("Run").with_id("h1"), 1);
        snap.set_status("h1", date(1), TimeSlot::Morning, Status::Done, 2);

        assert!(snap.delete_habit("h1", 3));
        assert!(snap.habit("h1").unwrap().deleted);
        assert_eq!(snap.live_habits().count(), 0);
        assert_eq!(snap.logs.len(), 1);
        assert!(!snap.delete_habit("missing", 4));
    }

    #[test]
    fn test_purge_habit_prunes_logs_and_notes() {
        let mut snap = AppSnapshot::new();
        snap.upsert_habit(Habit::new("Run").with_id("h1"), 1);
        snap.set_status("h1", date(1), TimeSlot::Morning, Status::Done, 2);
        snap.set_day_entry("h1", date(1), DayEntry::default().with_goal_override(2), 3);

        assert_eq!(snap.purge_habit("h1", 4), Some(1));
        assert!(snap.logs.is_empty());
        assert!(snap.days.is_empty());
        assert!(snap.habit("h1").unwrap().deleted);
        assert!(snap.habit("h1").unwrap().purged);
        assert_eq!(snap.purge_habit("missing", 5), None);
    }
}
