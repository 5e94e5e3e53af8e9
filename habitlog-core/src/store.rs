//! The monthly log store: one [`MonthlyBlock`] per habit-month.
//!
//! The store is an owned value. Callers thread it through their own state
//! and mutate it with `&mut self` methods; nothing here is shared.
//!
//! Every mutation records the touched month so the shard cache can
//! re-serialize only what changed.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::block::MonthlyBlock;
use crate::codec;
use crate::log_key::{LogKey, MonthKey};
use crate::models::{Status, TimeSlot};

#[derive(Debug, Clone, Default)]
pub struct LogStore {
    entries: BTreeMap<LogKey, MonthlyBlock>,
    dirty: BTreeSet<MonthKey>,
}

impl LogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &LogKey) -> Option<&MonthlyBlock> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &LogKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, LogKey, MonthlyBlock> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &LogKey> {
        self.entries.keys()
    }

    /// Distinct months that have at least one block.
    pub fn months(&self) -> BTreeSet<MonthKey> {
        self.entries.keys().map(|key| key.month).collect()
    }

    /// Status of one slot. A missing block means "no history" and reads as
    /// `Null`, as does a tombstoned slot.
    pub fn get_status(&self, habit_id: &str, date: NaiveDate, slot: TimeSlot) -> Status {
        let key = LogKey::for_date(habit_id, date);
        match self.entries.get(&key) {
            Some(block) => {
                codec::decode_status(codec::read_block(block, codec::position_for(date, slot)))
            }
            None => Status::Null,
        }
    }

    /// Writes one slot. Writing `Null` stores a tombstone so the deletion
    /// survives a later merge with a replica that still has the old value.
    pub fn set_status(&mut self, habit_id: &str, date: NaiveDate, slot: TimeSlot, status: Status) {
        let key = LogKey::for_date(habit_id, date);
        let offset = codec::position_for(date, slot);
        let current = self.entries.get(&key).copied().unwrap_or_default();
        let updated = codec::write_block(&current, offset, codec::encode_status(status));
        self.insert(key, updated);
    }

    /// Returns true if the slot holds an explicit deletion.
    pub fn is_tombstoned(&self, habit_id: &str, date: NaiveDate, slot: TimeSlot) -> bool {
        let key = LogKey::for_date(habit_id, date);
        self.entries
            .get(&key)
            .map(|block| codec::is_tombstone(codec::read_block(block, codec::position_for(date, slot))))
            .unwrap_or(false)
    }

    /// Inserts or replaces a whole block, marking its month dirty when the
    /// stored value changes.
    pub fn insert(&mut self, key: LogKey, block: MonthlyBlock) {
        let month = key.month;
        if self.entries.insert(key, block) != Some(block) {
            self.dirty.insert(month);
        }
    }

    /// Hard-deletes every block belonging to `habit_id`. Not represented by
    /// tombstones: a replica that has not pruned will resurrect the data on
    /// merge unless the habit itself is tombstoned.
    pub fn prune_logs_for_habit(&mut self, habit_id: &str) -> usize {
        let doomed: Vec<LogKey> = self
            .entries
            .keys()
            .filter(|key| key.habit_id == habit_id)
            .cloned()
            .collect();
        for key in &doomed {
            self.entries.remove(key);
            self.dirty.insert(key.month);
        }
        doomed.len()
    }

    /// Active (non-null) slots in a habit-month as `(day, slot, status)`.
    pub fn month_statuses(&self, habit_id: &str, month: MonthKey) -> Vec<(u32, TimeSlot, Status)> {
        let key = LogKey::new(habit_id, month);
        let Some(block) = self.entries.get(&key) else {
            return Vec::new();
        };
        codec::positions()
            .filter_map(|offset| {
                let status = codec::decode_status(codec::read_block(block, offset));
                let (day, slot) = codec::decode_position(offset)?;
                status.is_active().then_some((day, slot, status))
            })
            .collect()
    }

    pub fn dirty_months(&self) -> &BTreeSet<MonthKey> {
        &self.dirty
    }

    /// Drains the set of months touched since the last call.
    pub fn take_dirty(&mut self) -> BTreeSet<MonthKey> {
        std::mem::take(&mut self.dirty)
    }
}

/// Two stores are equal when they hold the same blocks; dirty tracking is
/// bookkeeping and does not participate.
impl PartialEq for LogStore {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for LogStore {}

impl FromIterator<(LogKey, MonthlyBlock)> for LogStore {
    fn from_iter<I: IntoIterator<Item = (LogKey, MonthlyBlock)>>(iter: I) -> Self {
        let mut store = LogStore::new();
        for (key, block) in iter {
            store.insert(key, block);
        }
        store
    }
}

impl<'a> IntoIterator for &'a LogStore {
    type Item = (&'a LogKey, &'a MonthlyBlock);
    type IntoIter = btree_map::Iter<'a, LogKey, MonthlyBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
