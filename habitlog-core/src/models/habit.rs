use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::time_slot::TimeSlot;

fn all_slots() -> Vec<TimeSlot> {
    TimeSlot::ALL.to_vec()
}

/// A tracked habit definition.
///
/// `deleted` hides the habit but keeps its history. `purged` additionally
/// marks its history as permanently removed. Both flags are tombstones: once
/// set on any replica they survive every merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default = "all_slots")]
    pub slots: Vec<TimeSlot>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub purged: bool,
}

impl Habit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            slots: all_slots(),
            created_at: Utc::now(),
            deleted: false,
            purged: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_slots(mut self, slots: Vec<TimeSlot>) -> Self {
        self.slots = slots;
        self
    }

    pub fn tracks(&self, slot: TimeSlot) -> bool {
        self.slots.contains(&slot)
    }
}

impl fmt::Display for Habit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots: Vec<String> = self.slots.iter().map(|s| s.to_string()).collect();
        write!(f, "{} ({})", self.name, slots.join(", "))?;
        if self.deleted {
            write!(f, " [deleted]")?;
        }
        Ok(())
    }
}
