use serde::{Deserialize, Serialize};

/// Per-day annotation for one habit: a free-text note and an optional
/// override of the habit's daily goal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_override: Option<u32>,
}

impl DayEntry {
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_goal_override(mut self, goal: u32) -> Self {
        self.goal_override = Some(goal);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.note.is_none() && self.goal_override.is_none()
    }
}
