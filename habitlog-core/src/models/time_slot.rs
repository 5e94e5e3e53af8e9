use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

/// One of the three daily check-in windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening];

    /// Bit offset of this slot within a day's 9-bit group.
    pub fn offset(self) -> u32 {
        match self {
            TimeSlot::Morning => 0,
            TimeSlot::Afternoon => 3,
            TimeSlot::Evening => 6,
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSlot::Morning => write!(f, "morning"),
            TimeSlot::Afternoon => write!(f, "afternoon"),
            TimeSlot::Evening => write!(f, "evening"),
        }
    }
}

impl FromStr for TimeSlot {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morning" | "am" => Ok(TimeSlot::Morning),
            "afternoon" | "pm" => Ok(TimeSlot::Afternoon),
            "evening" | "night" => Ok(TimeSlot::Evening),
            _ => Err(CodecError::UnknownSlot(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_slot_offsets() {
        assert_eq!(TimeSlot::Morning.offset(), 0);
        assert_eq!(TimeSlot::Afternoon.offset(), 3);
        assert_eq!(TimeSlot::Evening.offset(), 6);
    }

    #[test]
    fn test_time_slot_from_str() {
        assert_eq!(TimeSlot::from_str("morning").unwrap(), TimeSlot::Morning);
        assert_eq!(TimeSlot::from_str("AFTERNOON").unwrap(), TimeSlot::Afternoon);
        assert_eq!(TimeSlot::from_str("Evening").unwrap(), TimeSlot::Evening);
        assert_eq!(TimeSlot::from_str("pm").unwrap(), TimeSlot::Afternoon);
    }

    #[test]
    fn test_time_slot_from_str_invalid() {
        assert_eq!(
            TimeSlot::from_str("midnight"),
            Err(CodecError::UnknownSlot("midnight".to_string()))
        );
        assert!(TimeSlot::from_str("").is_err());
    }

    #[test]
    fn test_time_slot_json_roundtrip() {
        let json = serde_json::to_string(&TimeSlot::Evening).unwrap();
        assert_eq!(json, "\"evening\"");
        let parsed: TimeSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TimeSlot::Evening);
    }
}
