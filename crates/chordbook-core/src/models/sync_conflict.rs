//! Sync conflict projections

use serde::{Deserialize, Serialize};

use super::SyncMetadata;
use crate::sync::{RecordKind, SyncEntity};

/// Both sides changed the same record since the last successful sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConflict<T> {
    pub local_entity: T,
    pub remote_entity: T,
    pub local_metadata: SyncMetadata,
    pub remote_metadata: SyncMetadata,
}

/// Kind-agnostic view of a conflict, carrying only the metadata pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataConflict {
    pub kind: RecordKind,
    pub id: String,
    pub local: SyncMetadata,
    pub remote: SyncMetadata,
}

impl<T: SyncEntity> SyncConflict<T> {
    /// Id of the disputed record
    pub fn id(&self) -> &str {
        self.local_entity.id()
    }

    /// Project this conflict into its metadata-only form
    pub fn to_metadata_conflict(&self) -> MetadataConflict {
        MetadataConflict {
            kind: T::KIND,
            id: self.id().to_string(),
            local: self.local_metadata.clone(),
            remote: self.remote_metadata.clone(),
        }
    }
}
