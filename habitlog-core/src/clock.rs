//! Monotonic logical clock used as the freshness token of a snapshot.
//!
//! Values are milliseconds-scale so that, when the wall clock is sane, they
//! track real time. When the wall clock lags behind the last known value the
//! counter still advances by one.

use chrono::Utc;

/// Largest clock value accepted from outside. Anything above leaves no room
/// for a strictly greater successor.
pub const MAX_CLOCK: u64 = i64::MAX as u64;

/// Next clock value after `previous`, given the current wall time.
pub fn next_tick(previous: u64, wall_ms: u64) -> u64 {
    previous.saturating_add(1).max(wall_ms)
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn wall_clock_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
