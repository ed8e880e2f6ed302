//! Remote backend contract

use serde::{Deserialize, Serialize};

use super::RecordKind;
use crate::error::Result;
use crate::models::{Chart, DeletedChart, DeletedSetList, MetadataMap, SetList, SyncMetadata};

/// Everything a remote holds, for both record kinds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteBundle {
    pub charts: Vec<Chart>,
    pub set_lists: Vec<SetList>,
    pub chart_metadata: MetadataMap,
    pub set_list_metadata: MetadataMap,
    pub deleted_charts: Vec<DeletedChart>,
    pub deleted_set_lists: Vec<DeletedSetList>,
}

impl RemoteBundle {
    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
            && self.set_lists.is_empty()
            && self.chart_metadata.is_empty()
            && self.set_list_metadata.is_empty()
            && self.deleted_charts.is_empty()
            && self.deleted_set_lists.is_empty()
    }
}

/// Metadata maps for both record kinds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteMetadata {
    pub charts: MetadataMap,
    pub set_lists: MetadataMap,
}

/// Remote quota usage, in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub used: u64,
    /// `None` when the backend does not report a quota
    pub total: Option<u64>,
}

/// Capability a concrete backend provides to the sync engine.
///
/// Implementations own their transport, timeouts and token refresh; the
/// engine treats any returned error as a failed step.
#[allow(async_fn_in_trait)]
pub trait RemoteAdapter {
    /// Whether a usable session exists right now
    fn is_authenticated(&self) -> bool;

    /// Establish a session (may wait on the user)
    async fn authenticate(&self) -> Result<()>;

    /// Drop the current session
    async fn sign_out(&self) -> Result<()>;

    /// Fetch the whole remote state. Empty, not an error, when nothing exists yet.
    async fn pull(&self) -> Result<RemoteBundle>;

    /// Replace the remote state. Must fail on any write failure.
    async fn push(&self, bundle: &RemoteBundle) -> Result<()>;

    /// Fetch only the metadata maps
    async fn remote_metadata(&self) -> Result<RemoteMetadata> {
        let bundle = self.pull().await?;
        Ok(RemoteMetadata {
            charts: bundle.chart_metadata,
            set_lists: bundle.set_list_metadata,
        })
    }

    /// Patch a single metadata record outside a sync cycle
    async fn update_metadata(&self, kind: RecordKind, id: &str, metadata: SyncMetadata)
        -> Result<()>;

    /// Informational quota usage
    async fn storage_info(&self) -> Result<StorageInfo>;
}
