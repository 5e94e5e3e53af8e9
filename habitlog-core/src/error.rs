//! Error types for the log store and its wire format.

use thiserror::Error;

/// Errors raised when addressing a position inside a monthly block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Day out of range: {0} (expected 1-31)")]
    DayOutOfRange(u32),

    #[error("Unknown time slot '{0}'. Valid options: morning, afternoon, evening")]
    UnknownSlot(String),

    #[error("Unknown status '{0}'. Valid options: none, done, deferred, done-plus")]
    UnknownStatus(String),
}

/// Errors parsing a `YYYY-MM` month key or a `<habit>_<YYYY-MM>` log key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogKeyError {
    #[error("Invalid month key '{0}'. Use YYYY-MM.")]
    InvalidMonth(String),

    #[error("Invalid log key '{0}'. Expected <habit>_<YYYY-MM>.")]
    InvalidKey(String),
}

/// Errors parsing a hex-encoded monthly block.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockParseError {
    #[error("Empty block value")]
    Empty,

    #[error("Block value is wider than {max} hex digits: {len}")]
    TooWide { len: usize, max: usize },

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Block value sets bits outside the day/slot range")]
    UnusedBitsSet,
}

/// Errors decoding a serialized snapshot.
#[derive(Error, Debug)]
pub enum WireError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported log layout version {found} (this build reads version {expected})")]
    UnsupportedLayout { found: u32, expected: u32 },

    #[error("Snapshot clock {found} is beyond the supported maximum {max}")]
    ClockOutOfRange { found: u64, max: u64 },
}

/// Errors from pushing a snapshot to a remote store.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Gave up after {0} conflicting attempts")]
    TooManyConflicts(u32),

    #[error(transparent)]
    Wire(#[from] WireError),
}
