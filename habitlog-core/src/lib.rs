//! Habitlog Core Library
//!
//! Per-habit monthly log store and its conflict-free merge engine.
//!
//! Completion history for one habit-month is packed into a single
//! [`MonthlyBlock`]. Two replicas' stores merge without coordination
//! ([`merge_logs`]), and whole application snapshots reconcile on top of
//! that ([`reconcile`]).

pub mod block;
pub mod clock;
pub mod codec;
pub mod error;
pub mod log_key;
pub mod merge;
pub mod models;
pub mod reconcile;
pub mod shard;
pub mod snapshot;
pub mod store;
pub mod sync;
pub mod wire;

pub use block::MonthlyBlock;
pub use error::{BlockParseError, CodecError, LogKeyError, SyncError, WireError};
pub use log_key::{LogKey, MonthKey};
pub use merge::{merge_block, merge_logs};
pub use models::{DayEntry, Habit, Status, TimeSlot};
pub use reconcile::{reconcile, reconcile_at};
pub use shard::{ShardCache, ShardEntry, Shards};
pub use snapshot::AppSnapshot;
pub use store::LogStore;
pub use sync::{push, CasOutcome, MemoryRemote, PushOutcome, PushReport, RemoteStore};
pub use wire::{ImportDiagnostic, WireSnapshot};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
