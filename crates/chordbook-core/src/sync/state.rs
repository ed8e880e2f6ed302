//! Sync cycle phases.

use serde::{Deserialize, Serialize};

/// Where a [`SyncManager`](super::SyncManager) is in its current cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncPhase {
    Idle,
    Pulling,
    ConflictCheck,
    AwaitingDecision,
    Merging,
    Pushing,
    Done,
    Failed,
    Cancelled,
}
