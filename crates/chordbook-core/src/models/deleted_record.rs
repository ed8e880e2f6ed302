//! Deletion tombstones

use serde::{Deserialize, Serialize};

/// Marker recording that an entity was deleted on some device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedRecord {
    /// Id of the deleted entity
    pub id: String,
    /// Deletion timestamp (Unix ms)
    pub deleted_at: i64,
    /// Device that performed the deletion
    pub device_id: String,
}

/// Tombstone for a chart
pub type DeletedChart = DeletedRecord;

/// Tombstone for a set-list
pub type DeletedSetList = DeletedRecord;

impl DeletedRecord {
    pub fn new(id: impl Into<String>, deleted_at: i64, device_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            deleted_at,
            device_id: device_id.into(),
        }
    }
}
