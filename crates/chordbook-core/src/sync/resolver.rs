//! Caller-supplied conflict decisions

use serde::{Deserialize, Serialize};

use crate::models::{Chart, SetList, SyncConflict};

/// What to do once conflicts were shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictDecision {
    /// Continue; last-write-wins settles every conflict
    Overwrite,
    /// Abort the cycle before anything is pushed
    Cancel,
}

/// All conflicts detected in one cycle
#[derive(Debug, Clone, Copy)]
pub struct ConflictSet<'a> {
    pub charts: &'a [SyncConflict<Chart>],
    pub set_lists: &'a [SyncConflict<SetList>],
}

impl ConflictSet<'_> {
    pub fn len(&self) -> usize {
        self.charts.len() + self.set_lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pause point of a sync cycle: decides whether conflicting changes are
/// overwritten or the cycle is cancelled.
#[allow(async_fn_in_trait)]
pub trait ConflictResolver {
    async fn decide(&self, conflicts: ConflictSet<'_>) -> ConflictDecision;
}

impl<F> ConflictResolver for F
where
    F: Fn(ConflictSet<'_>) -> ConflictDecision,
{
    async fn decide(&self, conflicts: ConflictSet<'_>) -> ConflictDecision {
        self(conflicts)
    }
}
