use clap::{Args, Subcommand};

use habitlog_core::{clock, AppSnapshot, Habit, TimeSlot};

use super::{resolve_habit_id, OutputFormat};
use crate::storage::SnapshotStorage;

#[derive(Args)]
pub struct HabitCommand {
    #[command(subcommand)]
    pub command: HabitSubcommand,
}

#[derive(Subcommand)]
pub enum HabitSubcommand {
    /// Start tracking a new habit
    Add {
        /// Name of the habit
        name: String,

        /// Time slot to track (morning, afternoon, evening); can be repeated,
        /// defaults to all three
        #[arg(long = "slot", value_name = "SLOT")]
        slots: Vec<String>,
    },

    /// List habits
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Include deleted habits
        #[arg(long)]
        all: bool,
    },

    /// Hide a habit; its history is kept
    Delete {
        /// Habit ID or name
        habit: String,
    },

    /// Permanently remove a habit and all of its history
    Purge {
        /// Habit ID or name
        habit: String,
    },
}

impl HabitCommand {
    pub fn run(&self, storage: &SnapshotStorage) -> Result<(), Box<dyn std::error::Error>> {
        let (mut snapshot, _) = storage.load_or_default()?;

        match &self.command {
            HabitSubcommand::Add { name, slots } => {
                if name.trim().is_empty() {
                    return Err("Habit name cannot be empty".into());
                }

                let mut habit = Habit::new(name.trim());
                if !slots.is_empty() {
                    let parsed = slots
                        .iter()
                        .map(|s| s.parse::<TimeSlot>())
                        .collect::<Result<Vec<_>, _>>()?;
                    habit = habit.with_slots(parsed);
                }

                println!("Created habit:");
                println!("  {}  {}", habit.id, habit);
                snapshot.upsert_habit(habit, clock::wall_clock_ms());
                storage.save(&snapshot)?;
                Ok(())
            }
            HabitSubcommand::List { format, all } => {
                list_habits(&snapshot, format, *all)
            }
            HabitSubcommand::Delete { habit } => {
                let id = resolve_habit_id(&snapshot, habit)?;
                snapshot.delete_habit(&id, clock::wall_clock_ms());
                storage.save(&snapshot)?;
                println!("Deleted habit {} (history kept)", id);
                Ok(())
            }
            HabitSubcommand::Purge { habit } => {
                let id = resolve_habit_id(&snapshot, habit)?;
                let removed = snapshot
                    .purge_habit(&id, clock::wall_clock_ms())
                    .unwrap_or_default();
                storage.save(&snapshot)?;
                println!("Purged habit {} ({} month(s) of history removed)", id, removed);
                Ok(())
            }
        }
    }
}

fn list_habits(
    snapshot: &AppSnapshot,
    format: &OutputFormat,
    all: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let habits: Vec<&Habit> = snapshot
        .habits
        .iter()
        .filter(|h| all || !h.deleted)
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        OutputFormat::Text => {
            if habits.is_empty() {
                println!("No habits found.");
                return Ok(());
            }
            for habit in habits {
                println!("{}  {}", habit.id, habit);
            }
        }
    }
    Ok(())
}
