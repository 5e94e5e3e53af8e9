//! Serialized form of a snapshot for disk and network.
//!
//! Logs travel as `(LogKey, hex)` pairs. Decoding validates every pair at
//! the boundary; a malformed entry is skipped with a diagnostic instead of
//! failing the whole import.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::block::MonthlyBlock;
use crate::clock::MAX_CLOCK;
use crate::codec::LAYOUT_VERSION;
use crate::error::WireError;
use crate::log_key::LogKey;
use crate::models::{DayEntry, Habit};
use crate::shard::Shards;
use crate::snapshot::{AppSnapshot, DayEntries};
use crate::store::LogStore;

/// JSON document for one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireSnapshot {
    pub layout: u32,
    pub last_modified: u64,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub days: BTreeMap<String, BTreeMap<String, DayEntry>>,
    #[serde(default)]
    pub logs: BTreeMap<String, String>,
}

/// A skipped entry and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDiagnostic {
    pub key: String,
    pub reason: String,
}

impl fmt::Display for ImportDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped '{}': {}", self.key, self.reason)
    }
}

/// Result of decoding: the snapshot plus whatever had to be dropped.
#[derive(Debug, Clone)]
pub struct Import {
    pub snapshot: AppSnapshot,
    pub diagnostics: Vec<ImportDiagnostic>,
}

impl WireSnapshot {
    pub fn from_snapshot(snapshot: &AppSnapshot) -> Self {
        let days = snapshot
            .days
            .iter()
            .map(|(date, entries)| (date.format("%Y-%m-%d").to_string(), entries.clone()))
            .collect();

        Self {
            layout: LAYOUT_VERSION,
            last_modified: snapshot.last_modified,
            habits: snapshot.habits.clone(),
            days,
            logs: encode_logs(&snapshot.logs),
        }
    }

    /// Converts to a snapshot. Fails on a layout mismatch or a clock too
    /// large to advance; bad entries are reported in [`Import::diagnostics`].
    pub fn into_snapshot(self) -> Result<Import, WireError> {
        if self.layout != LAYOUT_VERSION {
            return Err(WireError::UnsupportedLayout {
                found: self.layout,
                expected: LAYOUT_VERSION,
            });
        }
        if self.last_modified > MAX_CLOCK {
            return Err(WireError::ClockOutOfRange {
                found: self.last_modified,
                max: MAX_CLOCK,
            });
        }

        let (logs, mut diagnostics) = decode_log_pairs(&self.logs);

        let mut days = DayEntries::new();
        for (date, entries) in self.days {
            match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
                Ok(parsed) => {
                    days.insert(parsed, entries);
                }
                Err(e) => {
                    tracing::warn!("Skipping day entries for '{}': {}", date, e);
                    diagnostics.push(ImportDiagnostic {
                        key: date,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(Import {
            snapshot: AppSnapshot {
                habits: self.habits,
                days,
                logs,
                last_modified: self.last_modified,
            },
            diagnostics,
        })
    }
}

/// Encodes every block as a `key -> lowercase hex` pair.
pub fn encode_logs(store: &LogStore) -> BTreeMap<String, String> {
    store
        .iter()
        .map(|(key, block)| (key.to_string(), block.to_hex()))
        .collect()
}

/// Decodes `key -> hex` pairs, skipping and logging anything malformed.
pub fn decode_log_pairs<I, K, V>(pairs: I) -> (LogStore, Vec<ImportDiagnostic>)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut store = LogStore::new();
    let mut diagnostics = Vec::new();

    for (key, value) in pairs {
        let (key, value) = (key.as_ref(), value.as_ref());
        let parsed = key
            .parse::<LogKey>()
            .map_err(|e| e.to_string())
            .and_then(|k| {
                MonthlyBlock::from_hex(value)
                    .map(|block| (k, block))
                    .map_err(|e| e.to_string())
            });

        match parsed {
            Ok((log_key, block)) => store.insert(log_key, block),
            Err(reason) => {
                tracing::warn!("Skipping log entry '{}': {}", key, reason);
                diagnostics.push(ImportDiagnostic {
                    key: key.to_string(),
                    reason,
                });
            }
        }
    }

    (store, diagnostics)
}

/// Rebuilds a store from exported shards.
pub fn decode_shards(shards: &Shards) -> (LogStore, Vec<ImportDiagnostic>) {
    decode_log_pairs(
        shards
            .values()
            .flatten()
            .map(|entry| (entry.key.to_string(), entry.hex.as_str())),
    )
}

pub fn to_json(snapshot: &AppSnapshot) -> Result<String, WireError> {
    Ok(serde_json::to_string(&WireSnapshot::from_snapshot(snapshot))?)
}

pub fn to_json_pretty(snapshot: &AppSnapshot) -> Result<String, WireError> {
    Ok(serde_json::to_string_pretty(&WireSnapshot::from_snapshot(
        snapshot,
    ))?)
}

pub fn from_json(json: &str) -> Result<Import, WireError> {
    let wire: WireSnapshot = serde_json::from_str(json)?;
    wire.into_snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_key::MonthKey;
    use crate::models::{Status, TimeSlot};
    use crate::shard::ShardCache;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_snapshot() -> AppSnapshot {
        let mut snap = AppSnapshot::new();
        snap.upsert_habit(Habit::new("Run").with_id("h1"), 10);
        snap.set_status("h1", date(2024, 1, 1), TimeSlot::Morning, Status::Done, 11);
        snap.set_status("h1", date(2024, 1, 31), TimeSlot::Evening, Status::Null, 12);
        snap.set_status("h1", date(2024, 2, 14), TimeSlot::Afternoon, Status::DonePlus, 13);
        snap.set_day_entry("h1", date(2024, 1, 1), DayEntry::default().with_note("5k"), 14);
        snap
    }

    #[test]
    fn test_json_roundtrip_preserves_blocks() {
        let snap = sample_snapshot();
        let json = to_json(&snap).unwrap();
        let import = from_json(&json).unwrap();

        assert!(import.diagnostics.is_empty());
        assert_eq!(import.snapshot, snap);
        for (key, block) in &snap.logs {
            assert_eq!(import.snapshot.logs.get(key), Some(block));
        }
    }

    #[test]
    fn test_wire_shape() {
        let wire = WireSnapshot::from_snapshot(&sample_snapshot());
        assert_eq!(wire.layout, LAYOUT_VERSION);
        // Day 1 morning done, day 31 evening tombstoned (bit 278).
        let january = format!("4{}1", "0".repeat(68));
        assert_eq!(wire.logs.get("h1_2024-01"), Some(&january));
        // Day 14 afternoon done-plus sits at bit 120.
        let february = format!("3{}", "0".repeat(30));
        assert_eq!(wire.logs.get("h1_2024-02"), Some(&february));
        assert!(wire.days.contains_key("2024-01-01"));
    }

    #[test]
    fn test_unsupported_layout_is_rejected() {
        let json = r#"{"layout":1,"last_modified":5,"logs":{}}"#;
        let err = from_json(json).unwrap_err();
        assert!(matches!(
            err,
            WireError::UnsupportedLayout {
                found: 1,
                expected: 2
            }
        ));
    }

    #[test]
    fn test_clock_beyond_ceiling_is_rejected() {
        let json = format!(r#"{{"layout":2,"last_modified":{}}}"#, u64::MAX);
        let err = from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            WireError::ClockOutOfRange { found: u64::MAX, max: MAX_CLOCK }
        ));

        let json = format!(r#"{{"layout":2,"last_modified":{}}}"#, MAX_CLOCK);
        let import = from_json(&json).unwrap();
        let merged =
            crate::reconcile::reconcile_at(Some(&import.snapshot), Some(&AppSnapshot::new()), 0);
        assert!(merged.last_modified > MAX_CLOCK);
    }

    #[test]
    fn test_year_limits_roundtrip() {
        let mut snap = AppSnapshot::new();
        let far_future = date(10000, 1, 1);
        let before_epoch = date(-1, 12, 31);
        snap.set_status("h1", far_future, TimeSlot::Morning, Status::Done, 1);
        snap.set_status("h1", before_epoch, TimeSlot::Evening, Status::Null, 2);
        snap.set_status("h1", NaiveDate::MAX, TimeSlot::Afternoon, Status::DonePlus, 3);
        snap.set_status("h1", NaiveDate::MIN, TimeSlot::Morning, Status::Deferred, 4);

        let import = from_json(&to_json(&snap).unwrap()).unwrap();
        assert!(import.diagnostics.is_empty());
        assert_eq!(import.snapshot.logs, snap.logs);
        assert_eq!(
            import.snapshot.logs.get_status("h1", far_future, TimeSlot::Morning),
            Status::Done
        );
        assert!(import
            .snapshot
            .logs
            .is_tombstoned("h1", before_epoch, TimeSlot::Evening));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let pairs = vec![
            ("h1_2024-01", "0x1"),
            ("h2_2024-01", "not-hex"),
            ("bad-key", "1"),
            ("h3_2024-13", "1"),
            ("h4_2024-01", "0X1C"),
        ];
        let (store, diagnostics) = decode_log_pairs(pairs);

        assert_eq!(store.len(), 2);
        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics[0].key, "h2_2024-01");
        assert_eq!(
            store.get_status("h4", date(2024, 1, 1), TimeSlot::Afternoon),
            Status::DonePlus
        );
        assert_eq!(
            store.get_status("h4", date(2024, 1, 1), TimeSlot::Morning),
            Status::Null
        );
        assert!(store.is_tombstoned("h4", date(2024, 1, 1), TimeSlot::Morning));
    }

    #[test]
    fn test_out_of_range_bits_are_skipped() {
        let huge = format!("1{}", "0".repeat(70));
        let (store, diagnostics) = decode_log_pairs([("h1_2024-01", huge.as_str())]);
        assert!(store.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_bad_day_key_is_skipped() {
        let json = r#"{
            "layout": 2,
            "last_modified": 7,
            "days": {"2024-01-01": {"h1": {"note": "ok"}}, "yesterday": {"h1": {}}}
        }"#;
        let import = from_json(json).unwrap();
        assert_eq!(import.diagnostics.len(), 1);
        assert_eq!(import.diagnostics[0].key, "yesterday");
        assert_eq!(import.snapshot.days.len(), 1);
        assert_eq!(import.snapshot.last_modified, 7);
    }

    #[test]
    fn test_shards_roundtrip() {
        let mut snap = sample_snapshot();
        let mut cache = ShardCache::new();
        let shards = cache.shards(&mut snap.logs).clone();
        assert_eq!(shards.len(), 2);
        assert!(shards.contains_key(&MonthKey::new(2024, 2).unwrap()));

        let (store, diagnostics) = decode_shards(&shards);
        assert!(diagnostics.is_empty());
        assert_eq!(store, snap.logs);
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = ImportDiagnostic {
            key: "x".into(),
            reason: "bad".into(),
        };
        assert_eq!(diag.to_string(), "skipped 'x': bad");
    }
}
