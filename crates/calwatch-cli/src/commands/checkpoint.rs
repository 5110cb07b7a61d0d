//! `calwatch checkpoint` -- inspect and reset per-calendar sync state.

use clap::Subcommand;

use calwatch_core::{CheckpointStore, Database, SnapshotStore};

#[derive(Subcommand)]
pub enum CheckpointAction {
    /// Show the stored sync token and snapshot count for a calendar
    Show { calendar_id: String },
    /// Drop the stored sync token; the next run falls back to the
    /// lookback window
    Clear { calendar_id: String },
}

pub fn run(action: CheckpointAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        CheckpointAction::Show { calendar_id } => {
            match db.checkpoint(&calendar_id)? {
                Some(token) => println!("sync token: {token}"),
                None => println!("sync token: (none -- next run uses the lookback window)"),
            }
            println!("snapshots: {}", db.snapshot_count()?);
        }
        CheckpointAction::Clear { calendar_id } => {
            db.clear_checkpoint(&calendar_id)?;
            println!("Cleared sync token for {calendar_id}.");
        }
    }
    Ok(())
}
