use clap::Args;

use habitlog_core::{clock, DayEntry};

use super::{parse_date, resolve_habit_id};
use crate::storage::SnapshotStorage;

/// Annotate a habit's day with a note or a goal override
#[derive(Args)]
pub struct NoteCommand {
    /// Habit ID or name
    pub habit: String,

    /// Date (YYYY-MM-DD)
    pub date: String,

    /// Note text
    #[arg(long)]
    pub text: Option<String>,

    /// Override the daily goal for this date
    #[arg(long)]
    pub goal: Option<u32>,

    /// Remove the annotation
    #[arg(long, conflicts_with_all = ["text", "goal"])]
    pub clear: bool,
}

impl NoteCommand {
    pub fn run(&self, storage: &SnapshotStorage) -> Result<(), Box<dyn std::error::Error>> {
        let (mut snapshot, _) = storage.load_or_default()?;
        let id = resolve_habit_id(&snapshot, &self.habit)?;
        let date = parse_date(&self.date)?;

        if !self.clear && self.text.is_none() && self.goal.is_none() {
            match snapshot.day_entry(&id, date) {
                Some(entry) => {
                    if let Some(note) = &entry.note {
                        println!("Note: {}", note);
                    }
                    if let Some(goal) = entry.goal_override {
                        println!("Goal: {}", goal);
                    }
                }
                None => println!("No annotation for {} on {}", id, date),
            }
            return Ok(());
        }

        let mut entry = if self.clear {
            DayEntry::default()
        } else {
            snapshot.day_entry(&id, date).cloned().unwrap_or_default()
        };
        if let Some(text) = &self.text {
            entry = entry.with_note(text);
        }
        if let Some(goal) = self.goal {
            entry = entry.with_goal_override(goal);
        }

        snapshot.set_day_entry(&id, date, entry, clock::wall_clock_ms());
        storage.save(&snapshot)?;
        println!("Updated annotation for {} on {}", id, date);
        Ok(())
    }
}
