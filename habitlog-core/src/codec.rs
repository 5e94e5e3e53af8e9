//! Bit layout of a monthly block (layout version 2).
//!
//! Each day owns 9 bits: three 3-bit status blocks for morning, afternoon and
//! evening. Inside a status block, bits 0-1 carry the [`Status`] and bit 2 is
//! the tombstone flag. A tombstoned block reads as [`Status::Null`] whatever
//! its status bits say.
//!
//! All functions here are pure arithmetic on [`MonthlyBlock`] values.

use chrono::{Datelike, NaiveDate};

use crate::block::MonthlyBlock;
use crate::error::CodecError;
use crate::models::{Status, TimeSlot};

/// Layout identifier written into every serialized snapshot.
pub const LAYOUT_VERSION: u32 = 2;

pub const BITS_PER_SLOT: u32 = 3;
pub const SLOTS_PER_DAY: u32 = 3;
pub const BITS_PER_DAY: u32 = BITS_PER_SLOT * SLOTS_PER_DAY;
pub const MAX_DAY: u32 = 31;
/// Number of meaningful bits in a block; everything above must be zero.
pub const USED_BITS: u32 = MAX_DAY * BITS_PER_DAY;

pub const BLOCK_MASK: u8 = 0b111;
pub const STATUS_MASK: u8 = 0b011;
pub const TOMBSTONE_BIT: u8 = 0b100;

/// Canonical explicitly-deleted block: tombstone set, status bits clear.
pub const TOMBSTONE: u8 = TOMBSTONE_BIT;

/// Bit offset of the status block for `day` (1-31) and `slot`.
pub fn encode_position(day: u32, slot: TimeSlot) -> Result<u32, CodecError> {
    if !(1..=MAX_DAY).contains(&day) {
        return Err(CodecError::DayOutOfRange(day));
    }
    Ok((day - 1) * BITS_PER_DAY + slot.offset())
}

/// Bit offset for a calendar date. Infallible since a `NaiveDate` always has
/// a valid day of month.
pub fn position_for(date: NaiveDate, slot: TimeSlot) -> u32 {
    (date.day() - 1) * BITS_PER_DAY + slot.offset()
}

/// Inverse of [`encode_position`].
pub fn decode_position(offset: u32) -> Option<(u32, TimeSlot)> {
    if offset >= USED_BITS || offset % BITS_PER_SLOT != 0 {
        return None;
    }
    let day = offset / BITS_PER_DAY + 1;
    let slot = match offset % BITS_PER_DAY {
        0 => TimeSlot::Morning,
        3 => TimeSlot::Afternoon,
        _ => TimeSlot::Evening,
    };
    Some((day, slot))
}

/// Every status-block offset in a month, in ascending order (93 positions).
pub fn positions() -> impl Iterator<Item = u32> {
    (0..MAX_DAY * SLOTS_PER_DAY).map(|i| i * BITS_PER_SLOT)
}

/// Reads the 3-bit status block at `offset`.
pub fn read_block(value: &MonthlyBlock, offset: u32) -> u8 {
    (*value >> offset).low_u8() & BLOCK_MASK
}

/// Returns a copy of `value` with the 3-bit block at `offset` replaced.
pub fn write_block(value: &MonthlyBlock, offset: u32, block: u8) -> MonthlyBlock {
    let window = MonthlyBlock::from(BLOCK_MASK) << offset;
    let cleared = *value & !window;
    cleared | (MonthlyBlock::from(block & BLOCK_MASK) << offset)
}

pub fn is_tombstone(block: u8) -> bool {
    block & TOMBSTONE_BIT != 0
}

/// Status a reader sees for a raw block.
pub fn decode_status(block: u8) -> Status {
    if is_tombstone(block) {
        Status::Null
    } else {
        Status::from_bits(block)
    }
}

/// Raw block for a status write. Writing `Null` is an explicit deletion and
/// stores the tombstone pattern instead of zero.
pub fn encode_status(status: Status) -> u8 {
    match status {
        Status::Null => TOMBSTONE,
        other => other.bits(),
    }
}
