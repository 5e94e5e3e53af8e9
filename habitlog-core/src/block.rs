//! Fixed-width integer holding one habit-month of history.
//!
//! A month needs 279 bits (31 days x 3 slots x 3 bits). The block is stored
//! as five little-endian `u64` limbs (320 bits); everything above bit 279
//! stays zero.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not, Shl, Shr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::USED_BITS;
use crate::error::BlockParseError;

const LIMBS: usize = 5;
const BYTES: usize = LIMBS * 8;
const HEX_DIGITS: usize = BYTES * 2;

/// One month of packed status blocks for a single habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MonthlyBlock([u64; LIMBS]);

impl MonthlyBlock {
    pub const ZERO: MonthlyBlock = MonthlyBlock([0; LIMBS]);

    /// Returns true if no bit is set.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|limb| *limb == 0)
    }

    /// The lowest eight bits of the value.
    pub fn low_u8(&self) -> u8 {
        (self.0[0] & 0xff) as u8
    }

    /// Returns true if any bit at or above `USED_BITS` is set.
    fn has_unused_bits(&self) -> bool {
        !(*self >> USED_BITS).is_zero()
    }

    fn to_be_bytes(self) -> [u8; BYTES] {
        let mut bytes = [0u8; BYTES];
        for (i, limb) in self.0.iter().rev().enumerate() {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_be_bytes());
        }
        bytes
    }

    fn from_be_bytes(bytes: &[u8; BYTES]) -> Self {
        let mut limbs = [0u64; LIMBS];
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            limbs[LIMBS - 1 - i] = u64::from_be_bytes(word);
        }
        Self(limbs)
    }

    /// Lowercase hex without leading zeros or prefix. Zero renders as `"0"`.
    pub fn to_hex(&self) -> String {
        let encoded = hex::encode(self.to_be_bytes());
        let trimmed = encoded.trim_start_matches('0');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Parses a hex value, optionally prefixed with `0x`.
    ///
    /// Rejects values that set any bit outside the day/slot range, so a block
    /// that passes this check is always safe to hand to the codec.
    pub fn from_hex(s: &str) -> Result<Self, BlockParseError> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() {
            return Err(BlockParseError::Empty);
        }

        let significant = digits.trim_start_matches('0');
        if significant.len() > HEX_DIGITS {
            return Err(BlockParseError::TooWide {
                len: significant.len(),
                max: HEX_DIGITS,
            });
        }

        let padded = format!("{:0>width$}", significant, width = HEX_DIGITS);
        let mut bytes = [0u8; BYTES];
        hex::decode_to_slice(padded, &mut bytes)?;

        let block = Self::from_be_bytes(&bytes);
        if block.has_unused_bits() {
            return Err(BlockParseError::UnusedBitsSet);
        }
        Ok(block)
    }
}

impl From<u8> for MonthlyBlock {
    fn from(value: u8) -> Self {
        Self([value as u64, 0, 0, 0, 0])
    }
}

impl From<u64> for MonthlyBlock {
    fn from(value: u64) -> Self {
        Self([value, 0, 0, 0, 0])
    }
}

impl Shl<u32> for MonthlyBlock {
    type Output = MonthlyBlock;

    fn shl(self, rhs: u32) -> Self::Output {
        let mut out = [0u64; LIMBS];
        let limb_shift = (rhs / 64) as usize;
        let bit_shift = rhs % 64;
        for i in limb_shift..LIMBS {
            let src = i - limb_shift;
            out[i] |= self.0[src] << bit_shift;
            if bit_shift > 0 && src > 0 {
                out[i] |= self.0[src - 1] >> (64 - bit_shift);
            }
        }
        MonthlyBlock(out)
    }
}

impl Shr<u32> for MonthlyBlock {
    type Output = MonthlyBlock;

    fn shr(self, rhs: u32) -> Self::Output {
        let mut out = [0u64; LIMBS];
        let limb_shift = (rhs / 64) as usize;
        let bit_shift = rhs % 64;
        for (i, slot) in out.iter_mut().enumerate() {
            let src = i + limb_shift;
            if src >= LIMBS {
                break;
            }
            *slot |= self.0[src] >> bit_shift;
            if bit_shift > 0 && src + 1 < LIMBS {
                *slot |= self.0[src + 1] << (64 - bit_shift);
            }
        }
        MonthlyBlock(out)
    }
}

impl BitAnd for MonthlyBlock {
    type Output = MonthlyBlock;

    fn bitand(self, rhs: Self) -> Self::Output {
        let mut out = self.0;
        for (limb, other) in out.iter_mut().zip(rhs.0) {
            *limb &= other;
        }
        MonthlyBlock(out)
    }
}

impl BitOr for MonthlyBlock {
    type Output = MonthlyBlock;

    fn bitor(self, rhs: Self) -> Self::Output {
        let mut out = self.0;
        for (limb, other) in out.iter_mut().zip(rhs.0) {
            *limb |= other;
        }
        MonthlyBlock(out)
    }
}

impl Not for MonthlyBlock {
    type Output = MonthlyBlock;

    fn not(self) -> Self::Output {
        MonthlyBlock(self.0.map(|limb| !limb))
    }
}

impl fmt::Display for MonthlyBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::LowerHex for MonthlyBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?;
        }
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for MonthlyBlock {
    type Err = BlockParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for MonthlyBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for MonthlyBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_to_hex() {
        assert_eq!(MonthlyBlock::ZERO.to_hex(), "0");
        assert!(MonthlyBlock::ZERO.is_zero());
    }

    #[test]
    fn test_small_value_hex() {
        let block = MonthlyBlock::from(0x1au8);
        assert_eq!(block.to_hex(), "1a");
        assert_eq!(format!("{:#x}", block), "0x1a");
    }

    #[test]
    fn test_shift_across_limbs() {
        // A 3-bit window at offset 63 straddles the first two limbs.
        let block = MonthlyBlock::from(0b111u8) << 63;
        assert_eq!((block >> 63).low_u8(), 0b111);
        assert_eq!(block.0[0], 1 << 63);
        assert_eq!(block.0[1], 0b11);
    }

    #[test]
    fn test_shift_out_of_range_is_zero() {
        let block = MonthlyBlock::from(1u8) << 320;
        assert!(block.is_zero());
        let block = MonthlyBlock::from(u64::MAX) >> 320;
        assert!(block.is_zero());
    }

    #[test]
    fn test_highest_used_bit_roundtrip() {
        let block = MonthlyBlock::from(0b100u8) << 276;
        let hex = block.to_hex();
        assert_eq!(MonthlyBlock::from_hex(&hex).unwrap(), block);
    }

    #[test]
    fn test_from_hex_accepts_prefix_and_case() {
        assert_eq!(
            MonthlyBlock::from_hex("0x1A").unwrap(),
            MonthlyBlock::from(0x1au8)
        );
        assert_eq!(
            MonthlyBlock::from_hex("0X1a").unwrap(),
            MonthlyBlock::from(0x1au8)
        );
        assert_eq!(
            MonthlyBlock::from_hex("0001a").unwrap(),
            MonthlyBlock::from(0x1au8)
        );
    }

    #[test]
    fn test_from_hex_odd_length() {
        assert_eq!(
            MonthlyBlock::from_hex("abc").unwrap(),
            MonthlyBlock::from(0xabcu64)
        );
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert_eq!(MonthlyBlock::from_hex(""), Err(BlockParseError::Empty));
        assert_eq!(MonthlyBlock::from_hex("0x"), Err(BlockParseError::Empty));
        assert!(matches!(
            MonthlyBlock::from_hex("xyz"),
            Err(BlockParseError::InvalidHex(_))
        ));
        assert!(matches!(
            MonthlyBlock::from_hex("-1"),
            Err(BlockParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_from_hex_rejects_unused_bits() {
        let block = MonthlyBlock::from(1u8) << USED_BITS;
        assert_eq!(
            MonthlyBlock::from_hex(&block.to_hex()),
            Err(BlockParseError::UnusedBitsSet)
        );
    }

    #[test]
    fn test_from_hex_rejects_too_wide() {
        let wide = "f".repeat(HEX_DIGITS + 1);
        assert!(matches!(
            MonthlyBlock::from_hex(&wide),
            Err(BlockParseError::TooWide { .. })
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let block = (MonthlyBlock::from(0b001u8) << 9) | MonthlyBlock::from(0b100u8);
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, "\"204\"");
        let parsed: MonthlyBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, block);
    }
}
