//! Settings repository implementation

use libsql::Connection;

use crate::device::generate_device_id;
use crate::error::{Error, Result};
use crate::models::SyncConfig;
use crate::sync::SyncStateStore;

const SYNC_CONFIG_KEY: &str = "sync_config";
const LAST_SYNC_TIME_KEY: &str = "last_sync_time";
const DEVICE_ID_KEY: &str = "device_id";
const REMOTE_FOLDER_KEY: &str = "remote_folder";

/// libSQL key-value settings, also the persisted sync state
pub struct LibSqlSettingsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlSettingsRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl LibSqlSettingsRepository<'_> {
    /// This installation's device id, minted and stored on first use
    pub async fn device_id(&self) -> Result<String> {
        if let Some(id) = self.get_setting(DEVICE_ID_KEY).await? {
            return Ok(id);
        }
        let id = generate_device_id();
        self.set_setting(DEVICE_ID_KEY, &id).await?;
        tracing::info!(device_id = %id, "Registered new device id");
        Ok(id)
    }

    /// Folder the file-based remote points at, if one is connected
    pub async fn remote_folder(&self) -> Result<Option<String>> {
        self.get_setting(REMOTE_FOLDER_KEY).await
    }

    pub async fn set_remote_folder(&self, folder: Option<&str>) -> Result<()> {
        match folder {
            Some(folder) => self.set_setting(REMOTE_FOLDER_KEY, folder).await,
            None => self.delete_setting(REMOTE_FOLDER_KEY).await,
        }
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM settings WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            let value: String = row.get(0)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
                [key, value],
            )
            .await?;
        Ok(())
    }

    async fn delete_setting(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?", [key])
            .await?;
        Ok(())
    }
}

impl SyncStateStore for LibSqlSettingsRepository<'_> {
    async fn load_sync_config(&self) -> Result<SyncConfig> {
        match self.get_setting(SYNC_CONFIG_KEY).await? {
            Some(value) => match serde_json::from_str(&value) {
                Ok(config) => Ok(config),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable sync config: {e}");
                    Ok(SyncConfig::default())
                }
            },
            None => Ok(SyncConfig::default()),
        }
    }

    async fn save_sync_config(&self, config: &SyncConfig) -> Result<()> {
        let value = serde_json::to_string(config)?;
        self.set_setting(SYNC_CONFIG_KEY, &value).await
    }

    async fn last_sync_time(&self) -> Result<Option<i64>> {
        let Some(value) = self.get_setting(LAST_SYNC_TIME_KEY).await? else {
            return Ok(None);
        };
        value
            .parse()
            .map(Some)
            .map_err(|_| Error::Storage(format!("Invalid last sync time: {value}")))
    }

    async fn set_last_sync_time(&self, timestamp: i64) -> Result<()> {
        self.set_setting(LAST_SYNC_TIME_KEY, &timestamp.to_string())
            .await
    }
}
