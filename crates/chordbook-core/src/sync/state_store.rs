//! Persisted engine state contract

use crate::error::Result;
use crate::models::SyncConfig;

/// Key-value slot holding the sync preferences and the last-sync watermark
#[allow(async_fn_in_trait)]
pub trait SyncStateStore {
    /// Load preferences, falling back to defaults when none were saved
    async fn load_sync_config(&self) -> Result<SyncConfig>;

    async fn save_sync_config(&self, config: &SyncConfig) -> Result<()>;

    /// Completion time of the last successful sync (Unix ms)
    async fn last_sync_time(&self) -> Result<Option<i64>>;

    async fn set_last_sync_time(&self, timestamp: i64) -> Result<()>;
}
