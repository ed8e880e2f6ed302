//! Sync cycle outcomes and error classification

use std::fmt;

use serde::{Deserialize, Serialize};

use super::MergeOutcome;
use crate::error::Error;
use crate::models::{Chart, MetadataConflict, SetList, SyncConflict};

/// Broad cause of a failed cycle, for user-facing messaging and retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncErrorKind {
    Auth,
    Network,
    Storage,
    Unknown,
}

impl SyncErrorKind {
    pub fn classify(error: &Error) -> Self {
        match error {
            Error::NotAuthenticated => Self::Auth,
            Error::Network(_) => Self::Network,
            Error::LibSql(_)
            | Error::Io(_)
            | Error::Storage(_)
            | Error::Serialization(_) => Self::Storage,
            Error::Remote(message) => Self::classify_message(message),
            Error::NotFound(_) | Error::MalformedDocument { .. } | Error::AlreadySyncing => {
                Self::Unknown
            }
        }
    }

    /// Best-effort classification of free-form adapter messages
    fn classify_message(message: &str) -> Self {
        let message = message.to_ascii_lowercase();
        if ["not authenticated", "unauthenticated", "unauthorized", "401"]
            .iter()
            .any(|needle| message.contains(needle))
        {
            Self::Auth
        } else if ["fetch", "network", "connect", "timed out", "timeout"]
            .iter()
            .any(|needle| message.contains(needle))
        {
            Self::Network
        } else {
            Self::Unknown
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SyncErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failure captured during a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncError {
    pub kind: SyncErrorKind,
    /// Offending record id or remote document name, when one is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub message: String,
}

impl SyncError {
    pub fn from_error(error: &Error) -> Self {
        let id = match error {
            Error::NotFound(id) => Some(id.clone()),
            Error::MalformedDocument { document, .. } => Some(document.clone()),
            _ => None,
        };
        Self {
            kind: SyncErrorKind::classify(error),
            id,
            message: error.to_string(),
        }
    }
}

/// Merged state for both record kinds, handed back so the caller can apply it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedCollections {
    pub charts: MergeOutcome<Chart>,
    pub set_lists: MergeOutcome<SetList>,
}

/// Outcome of one sync cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    pub chart_conflicts: Vec<SyncConflict<Chart>>,
    pub set_list_conflicts: Vec<SyncConflict<SetList>>,
    /// Metadata-only view of every conflict above
    pub metadata_conflicts: Vec<MetadataConflict>,
    pub synced_chart_ids: Vec<String>,
    pub synced_set_list_ids: Vec<String>,
    /// Present only when `success` is true
    pub merged: Option<MergedCollections>,
    pub errors: Vec<SyncError>,
}

impl SyncResult {
    pub fn conflict_count(&self) -> usize {
        self.chart_conflicts.len() + self.set_list_conflicts.len()
    }

    pub fn has_conflicts(&self) -> bool {
        self.conflict_count() > 0
    }
}
