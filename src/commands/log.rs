use clap::{Args, Subcommand};

use habitlog_core::{clock, AppSnapshot, MonthKey, Status, TimeSlot};

use super::{parse_date, resolve_habit_id, OutputFormat};
use crate::storage::SnapshotStorage;

#[derive(Args)]
pub struct LogCommand {
    #[command(subcommand)]
    pub command: LogSubcommand,
}

#[derive(Subcommand)]
pub enum LogSubcommand {
    /// Record a status for one slot
    Set {
        /// Habit ID or name
        habit: String,
        /// Date (YYYY-MM-DD)
        date: String,
        /// Time slot (morning, afternoon, evening)
        slot: String,
        /// Status (done, deferred, done-plus, none)
        status: String,
    },

    /// Show the status of one slot
    Get {
        /// Habit ID or name
        habit: String,
        /// Date (YYYY-MM-DD)
        date: String,
        /// Time slot (morning, afternoon, evening)
        slot: String,
    },

    /// Explicitly clear a slot; the deletion wins when merged
    Clear {
        /// Habit ID or name
        habit: String,
        /// Date (YYYY-MM-DD)
        date: String,
        /// Time slot (morning, afternoon, evening)
        slot: String,
    },

    /// Show a month of history as a grid
    Month {
        /// Habit ID or name
        habit: String,
        /// Month (YYYY-MM)
        month: String,
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl LogCommand {
    pub fn run(&self, storage: &SnapshotStorage) -> Result<(), Box<dyn std::error::Error>> {
        let (mut snapshot, _) = storage.load_or_default()?;

        match &self.command {
            LogSubcommand::Set {
                habit,
                date,
                slot,
                status,
            } => {
                let status: Status = status.parse()?;
                write_slot(&mut snapshot, storage, habit, date, slot, status)
            }
            LogSubcommand::Clear { habit, date, slot } => {
                write_slot(&mut snapshot, storage, habit, date, slot, Status::Null)
            }
            LogSubcommand::Get { habit, date, slot } => {
                let id = resolve_habit_id(&snapshot, habit)?;
                let date = parse_date(date)?;
                let slot: TimeSlot = slot.parse()?;
                println!("{}", snapshot.logs.get_status(&id, date, slot));
                Ok(())
            }
            LogSubcommand::Month {
                habit,
                month,
                format,
            } => {
                let id = resolve_habit_id(&snapshot, habit)?;
                let month: MonthKey = month.parse()?;
                show_month(&snapshot, &id, month, format)
            }
        }
    }
}

fn write_slot(
    snapshot: &mut AppSnapshot,
    storage: &SnapshotStorage,
    habit: &str,
    date: &str,
    slot: &str,
    status: Status,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = resolve_habit_id(snapshot, habit)?;
    let date = parse_date(date)?;
    let slot: TimeSlot = slot.parse()?;
    if let Some(tracked) = snapshot.habit(&id) {
        if !tracked.tracks(slot) {
            return Err(format!("Habit '{}' does not track the {} slot", tracked.name, slot).into());
        }
    }

    snapshot.set_status(&id, date, slot, status, clock::wall_clock_ms());
    storage.save(snapshot)?;

    if status.is_active() {
        println!("{} {} {}: {}", id, date, slot, status);
    } else {
        println!("{} {} {}: cleared", id, date, slot);
    }
    Ok(())
}

fn show_month(
    snapshot: &AppSnapshot,
    habit_id: &str,
    month: MonthKey,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = snapshot
                .logs
                .month_statuses(habit_id, month)
                .into_iter()
                .map(|(day, slot, status)| {
                    serde_json::json!({ "day": day, "slot": slot, "status": status })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            println!("{} {}", habit_id, month);
            println!("{}", "=".repeat(30));
            for slot in TimeSlot::ALL {
                let row: String = (1..=month.days())
                    .filter_map(|day| month.date(day))
                    .map(|date| snapshot.logs.get_status(habit_id, date, slot).glyph())
                    .collect();
                println!("{:<10}{}", slot.to_string(), row);
            }
            println!();
            println!("x done  * done-plus  ~ deferred  . none");
        }
    }
    Ok(())
}
