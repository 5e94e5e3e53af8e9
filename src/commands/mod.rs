mod config_cmd;
mod export;
mod habit;
mod log;
mod merge;
mod note;
mod sync_cmd;

pub use config_cmd::ConfigCommand;
pub use export::ExportCommand;
pub use habit::HabitCommand;
pub use log::LogCommand;
pub use merge::MergeCommand;
pub use note::NoteCommand;
pub use sync_cmd::SyncCommand;

use chrono::NaiveDate;
use clap::ValueEnum;

use habitlog_core::AppSnapshot;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", s).into())
}

/// Resolves a habit by id, or by name among live habits.
pub(crate) fn resolve_habit_id(
    snapshot: &AppSnapshot,
    id_or_name: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    snapshot
        .find_habit(id_or_name)
        .map(|h| h.id.clone())
        .ok_or_else(|| format!("Habit not found: {}", id_or_name).into())
}
