use clap::Args;

use habitlog_core::{wire, ShardCache};

use crate::storage::SnapshotStorage;

/// Print the local snapshot as a wire document
#[derive(Args)]
pub struct ExportCommand {
    /// Print the month-sharded hex view of the logs instead
    #[arg(long)]
    pub shards: bool,
}

impl ExportCommand {
    pub fn run(&self, storage: &SnapshotStorage) -> Result<(), Box<dyn std::error::Error>> {
        let (mut snapshot, _) = storage.load_or_default()?;

        if self.shards {
            let mut cache = ShardCache::new();
            let shards = cache.shards(&mut snapshot.logs);
            println!("{}", serde_json::to_string_pretty(shards)?);
        } else {
            println!("{}", wire::to_json_pretty(&snapshot)?);
        }
        Ok(())
    }
}
