//! Set-list model

use serde::{Deserialize, Serialize};

use super::new_record_id;
use crate::sync::{RecordKind, SyncEntity};

/// An ordered list of charts to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetList {
    /// Unique identifier
    pub id: String,
    /// Display name (e.g. "Sunday service")
    pub name: String,
    /// Chart ids in performance order
    #[serde(default)]
    pub chart_ids: Vec<String>,
    /// Free-form notes for the band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last modification timestamp (Unix ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<i64>,
}

impl SetList {
    /// Create a new, empty set-list
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: new_record_id(),
            name: name.into(),
            chart_ids: Vec::new(),
            notes: None,
            created_at: now,
            last_modified_at: Some(now),
        }
    }

    #[must_use]
    pub fn with_charts(mut self, chart_ids: impl IntoIterator<Item = String>) -> Self {
        self.chart_ids = chart_ids.into_iter().collect();
        self
    }

    /// Mark the set-list as modified now
    pub fn touch(&mut self) {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_modified_at = Some(self.last_modified_at.map_or(now, |prev| prev.max(now)));
    }

    /// Drop references to a chart that no longer exists
    ///
    /// Returns `true` when the set-list changed.
    pub fn remove_chart(&mut self, chart_id: &str) -> bool {
        let before = self.chart_ids.len();
        self.chart_ids.retain(|id| id != chart_id);
        let changed = self.chart_ids.len() != before;
        if changed {
            self.touch();
        }
        changed
    }
}

impl SyncEntity for SetList {
    const KIND: RecordKind = RecordKind::SetList;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn last_modified_at(&self) -> Option<i64> {
        self.last_modified_at
    }
}
