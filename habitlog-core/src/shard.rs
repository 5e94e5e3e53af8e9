//! Per-month shards of the log store for incremental export.
//!
//! The cache groups hex-encoded blocks by month. After the first full build
//! only months the store reports dirty are re-serialized, so the cost of an
//! export tracks what changed rather than the size of the history.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::log_key::{LogKey, MonthKey};
use crate::store::LogStore;

/// One serialized block: its key and lowercase hex value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardEntry {
    pub key: LogKey,
    pub hex: String,
}

pub type Shards = BTreeMap<MonthKey, Vec<ShardEntry>>;

#[derive(Debug, Clone, Default)]
pub struct ShardCache {
    shards: Shards,
    materialized: bool,
}

impl ShardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    /// Drops everything; the next request rebuilds from scratch. Needed when
    /// the cache is pointed at a store it did not observe, e.g. a freshly
    /// merged one.
    pub fn invalidate(&mut self) {
        self.shards.clear();
        self.materialized = false;
    }

    /// Returns the shard map, refreshing only dirty months.
    ///
    /// Drains the store's dirty set.
    pub fn shards(&mut self, store: &mut LogStore) -> &Shards {
        if self.materialized && store.dirty_months().is_empty() {
            return &self.shards;
        }

        let dirty = store.take_dirty();
        let months: BTreeSet<MonthKey> = if self.materialized {
            dirty
        } else {
            self.shards.clear();
            store.months()
        };

        for month in &months {
            self.shards.remove(month);
        }

        for (key, block) in store.iter().filter(|(key, _)| months.contains(&key.month)) {
            self.shards.entry(key.month).or_default().push(ShardEntry {
                key: key.clone(),
                hex: block.to_hex(),
            });
        }

        tracing::debug!(
            "Materialized {} month shard(s), {} total",
            months.len(),
            self.shards.len()
        );

        self.materialized = true;
        &self.shards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Status, TimeSlot};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(y: i32, m: u32) -> MonthKey {
        MonthKey::new(y, m).unwrap()
    }

    fn sample_store() -> LogStore {
        let mut store = LogStore::new();
        store.set_status("h1", date(2024, 1, 1), TimeSlot::Morning, Status::Done);
        store.set_status("h2", date(2024, 1, 2), TimeSlot::Evening, Status::Deferred);
        store.set_status("h1", date(2024, 2, 1), TimeSlot::Morning, Status::DonePlus);
        store
    }

    #[test]
    fn test_first_materialization_groups_by_month() {
        let mut store = sample_store();
        let mut cache = ShardCache::new();

        let shards = cache.shards(&mut store);
        assert_eq!(shards.len(), 2);
        assert_eq!(shards[&month(2024, 1)].len(), 2);
        assert_eq!(shards[&month(2024, 2)].len(), 1);
        assert_eq!(shards[&month(2024, 2)][0].key.to_string(), "h1_2024-02");
        assert_eq!(shards[&month(2024, 2)][0].hex, "3");
        assert!(store.dirty_months().is_empty());
    }

    #[test]
    fn test_clean_store_returns_cached_shards() {
        let mut store = sample_store();
        let mut cache = ShardCache::new();
        let first = cache.shards(&mut store).clone();
        let second = cache.shards(&mut store).clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_only_dirty_months_are_refreshed() {
        let mut store = sample_store();
        let mut cache = ShardCache::new();
        cache.shards(&mut store);

        store.set_status("h1", date(2024, 2, 1), TimeSlot::Morning, Status::Deferred);
        assert_eq!(store.dirty_months().len(), 1);

        let shards = cache.shards(&mut store);
        assert_eq!(shards[&month(2024, 2)][0].hex, "2");
        assert_eq!(shards[&month(2024, 1)].len(), 2);
    }

    #[test]
    fn test_new_month_appears() {
        let mut store = sample_store();
        let mut cache = ShardCache::new();
        cache.shards(&mut store);

        store.set_status("h3", date(2024, 5, 31), TimeSlot::Evening, Status::Done);
        let shards = cache.shards(&mut store);
        assert_eq!(shards.len(), 3);
        assert!(shards.contains_key(&month(2024, 5)));
    }

    #[test]
    fn test_pruned_month_disappears() {
        let mut store = sample_store();
        let mut cache = ShardCache::new();
        cache.shards(&mut store);

        store.prune_logs_for_habit("h1");
        let shards = cache.shards(&mut store);
        assert!(!shards.contains_key(&month(2024, 2)));
        assert_eq!(shards[&month(2024, 1)].len(), 1);
        assert_eq!(shards[&month(2024, 1)][0].key.habit_id, "h2");
    }

    #[test]
    fn test_incremental_matches_full_rebuild() {
        let mut store = sample_store();
        let mut cache = ShardCache::new();
        cache.shards(&mut store);

        store.set_status("h2", date(2024, 1, 9), TimeSlot::Afternoon, Status::Done);
        store.set_status("h4", date(2023, 12, 25), TimeSlot::Morning, Status::Null);
        let incremental = cache.shards(&mut store).clone();

        let mut fresh = ShardCache::new();
        let full = fresh.shards(&mut store.clone()).clone();
        assert_eq!(incremental, full);
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let mut store = sample_store();
        let mut cache = ShardCache::new();
        cache.shards(&mut store);
        cache.invalidate();
        assert!(!cache.is_materialized());

        let mut other = LogStore::new();
        other.set_status("h9", date(2025, 6, 1), TimeSlot::Morning, Status::Done);
        other.take_dirty();
        let shards = cache.shards(&mut other);
        assert_eq!(shards.len(), 1);
        assert!(shards.contains_key(&month(2025, 6)));
    }
}
