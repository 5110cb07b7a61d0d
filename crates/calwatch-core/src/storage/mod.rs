mod database;

pub use database::Database;

use std::path::PathBuf;

use crate::error::{Result, StoreError};
use crate::event::EventSnapshot;

/// Property key holding the LINE Notify bearer token.
pub const PROPERTY_KEY_LINE_TOKEN: &str = "LINE_TOKEN";
/// Property key holding the Slack incoming-webhook URL for alerts.
pub const PROPERTY_KEY_SLACK_WEBHOOK_ENDPOINT: &str = "SLACK_WEBHOOK_ENDPOINT";
/// Property key holding the Google Calendar API access token.
pub const PROPERTY_KEY_GOOGLE_ACCESS_TOKEN: &str = "GOOGLE_ACCESS_TOKEN";

/// Durable per-calendar sync-token storage.
///
/// A token is only ever replaced by a newer one; absence means the
/// calendar has never been synced and the window fallback applies.
pub trait CheckpointStore {
    fn checkpoint(&self, calendar_id: &str) -> Result<Option<String>, StoreError>;
    fn set_checkpoint(&self, calendar_id: &str, token: &str) -> Result<(), StoreError>;
    /// Drop a token the provider has rejected as expired.
    fn clear_checkpoint(&self, calendar_id: &str) -> Result<(), StoreError>;
}

/// Durable key-value property storage for credentials and endpoints.
pub trait PropertyBag {
    fn get_property(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_property(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Mirrored store of the last known full detail per event.
///
/// `replace_all` is destructive-then-insert over the whole set: the
/// snapshots are a best-effort cache rebuilt from a fresh listing
/// after every successful run, not a source of truth.
pub trait SnapshotStore {
    fn lookup(&self, id: &str) -> Result<Option<EventSnapshot>, StoreError>;
    fn replace_all(&self, snapshots: &[EventSnapshot]) -> Result<(), StoreError>;
    fn snapshot_count(&self) -> Result<usize, StoreError>;
}

/// Returns `~/.config/calwatch[-dev]/` based on CALWATCH_ENV.
///
/// Set CALWATCH_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CALWATCH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("calwatch-dev")
    } else {
        base_dir.join("calwatch")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
