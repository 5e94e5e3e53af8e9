use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod remote;
mod storage;

use commands::{
    ConfigCommand, ExportCommand, HabitCommand, LogCommand, MergeCommand, NoteCommand,
    SyncCommand,
};
use config::Config;
use storage::SnapshotStorage;

#[derive(Parser)]
#[command(name = "habitlog")]
#[command(version)]
#[command(about = "A habit tracker with mergeable monthly logs", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage habits
    Habit(HabitCommand),

    /// Record and inspect slot statuses
    Log(LogCommand),

    /// Annotate a day with a note or goal override
    Note(NoteCommand),

    /// Merge another snapshot file into the local one
    Merge(MergeCommand),

    /// Print the local snapshot
    Export(ExportCommand),

    /// Sync with the shared remote snapshot
    Sync(SyncCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "habitlog=warn,habitlog_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;
    let storage = SnapshotStorage::new(config.data_dir.value.clone());

    match cli.command {
        Some(Commands::Habit(cmd)) => cmd.run(&storage)?,
        Some(Commands::Log(cmd)) => cmd.run(&storage)?,
        Some(Commands::Note(cmd)) => cmd.run(&storage)?,
        Some(Commands::Merge(cmd)) => cmd.run(&storage)?,
        Some(Commands::Export(cmd)) => cmd.run(&storage)?,
        Some(Commands::Sync(cmd)) => cmd.run(&storage, &config)?,
        Some(Commands::Config(cmd)) => cmd.run(&config)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
