//! Record-kind description shared by charts and set-lists

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Which synchronizable collection a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    Chart,
    SetList,
}

impl RecordKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::SetList => "setList",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A whole record the engine can merge.
///
/// The engine never looks inside an entity beyond its id and timestamps.
pub trait SyncEntity: Clone + Serialize + DeserializeOwned {
    const KIND: RecordKind;

    /// Stable unique identifier
    fn id(&self) -> &str;

    /// Creation time (Unix ms)
    fn created_at(&self) -> i64;

    /// Modification time set by the application, if any (Unix ms)
    fn last_modified_at(&self) -> Option<i64>;

    /// Effective modification time, falling back to creation time
    fn modified_at(&self) -> i64 {
        self.last_modified_at().unwrap_or_else(|| self.created_at())
    }
}
