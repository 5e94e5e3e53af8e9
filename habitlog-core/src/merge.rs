//! Conflict-free merge of two log stores.
//!
//! Merging is done block by block over every day/slot position:
//!
//! - a tombstone on either side wins and the result is the canonical
//!   tombstone, whatever the other side holds;
//! - otherwise the status bits are OR-ed, which keeps `DonePlus` over `Done`
//!   and keeps a value over an empty slot.
//!
//! The function has no notion of local or remote. It is commutative,
//! associative and idempotent over well-formed stores, so replicas can merge
//! pairwise in any order and still converge.

use crate::block::MonthlyBlock;
use crate::codec;
use crate::store::LogStore;

/// Merges two monthly blocks slot by slot.
pub fn merge_block(a: &MonthlyBlock, b: &MonthlyBlock) -> MonthlyBlock {
    if a == b {
        return *a;
    }
    codec::positions().fold(MonthlyBlock::ZERO, |merged, offset| {
        let left = codec::read_block(a, offset);
        let right = codec::read_block(b, offset);
        let block = if codec::is_tombstone(left) || codec::is_tombstone(right) {
            codec::TOMBSTONE
        } else {
            (left | right) & codec::STATUS_MASK
        };
        if block == 0 {
            merged
        } else {
            codec::write_block(&merged, offset, block)
        }
    })
}

/// Merges two stores into a new one. Keys present on one side only are
/// adopted as-is; keys on both sides go through [`merge_block`].
///
/// The result starts as a copy of `a`, so its dirty set covers `a`'s
/// pending months plus every month the merge changed relative to `a`.
pub fn merge_logs(a: &LogStore, b: &LogStore) -> LogStore {
    let mut merged = a.clone();
    let mut adopted = 0usize;
    let mut combined = 0usize;

    for (key, theirs) in b {
        match merged.get(key).copied() {
            None => {
                merged.insert(key.clone(), *theirs);
                adopted += 1;
            }
            Some(ours) => {
                merged.insert(key.clone(), merge_block(&ours, theirs));
                combined += 1;
            }
        }
    }

    tracing::debug!(
        "Merged logs: {} adopted, {} combined, {} total",
        adopted,
        combined,
        merged.len()
    );
    merged
}
