//! Per-record synchronization metadata

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sync bookkeeping for one entity id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    /// Completion time of the last sync that included this id (Unix ms, 0 = never)
    pub last_synced_at: i64,
    /// Copy of the entity's modification time when the metadata was built
    pub last_modified_at: i64,
    /// Device that produced this metadata
    pub device_id: String,
    /// Backend identifier, when it differs from the application id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

/// Metadata keyed by entity id, ordered for deterministic output
pub type MetadataMap = BTreeMap<String, SyncMetadata>;
