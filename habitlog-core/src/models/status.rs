use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

/// Completion status of one habit slot.
///
/// The numeric values are chosen so that `DonePlus` is a bit-superset of
/// `Done`; OR-ing two statuses keeps the more complete one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Status {
    #[default]
    #[serde(rename = "none")]
    Null = 0,
    Done = 1,
    Deferred = 2,
    DonePlus = 3,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::Null, Status::Done, Status::Deferred, Status::DonePlus];

    /// Decodes the two status bits; higher bits are ignored.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            1 => Status::Done,
            2 => Status::Deferred,
            3 => Status::DonePlus,
            _ => Status::Null,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    pub fn is_active(self) -> bool {
        self != Status::Null
    }

    /// Single-character glyph for grid views.
    pub fn glyph(self) -> char {
        match self {
            Status::Null => '.',
            Status::Done => 'x',
            Status::Deferred => '~',
            Status::DonePlus => '*',
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Null => write!(f, "none"),
            Status::Done => write!(f, "done"),
            Status::Deferred => write!(f, "deferred"),
            Status::DonePlus => write!(f, "done-plus"),
        }
    }
}

impl FromStr for Status {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "null" | "clear" => Ok(Status::Null),
            "done" => Ok(Status::Done),
            "deferred" | "skip" => Ok(Status::Deferred),
            "done-plus" | "doneplus" | "plus" => Ok(Status::DonePlus),
            _ => Err(CodecError::UnknownStatus(s.to_string())),
        }
    }
}
