//! Chord chart model

use serde::{Deserialize, Serialize};

use super::new_record_id;
use crate::sync::{RecordKind, SyncEntity};

/// A chord chart: one song's lyrics and chords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    /// Unique identifier
    pub id: String,
    /// Song title
    pub title: String,
    /// Performing or composing artist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Musical key (e.g. "G", "Bbm")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Tempo in beats per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<u16>,
    /// Chart body (chords over lyrics)
    #[serde(default)]
    pub content: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last modification timestamp (Unix ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<i64>,
}

impl Chart {
    /// Create a new chart with the given title and body
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: new_record_id(),
            title: title.into(),
            artist: None,
            key: None,
            tempo: None,
            content: content.into(),
            created_at: now,
            last_modified_at: Some(now),
        }
    }

    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub const fn with_tempo(mut self, tempo: u16) -> Self {
        self.tempo = Some(tempo);
        self
    }

    /// Mark the chart as modified now
    pub fn touch(&mut self) {
        let now = chrono::Utc::now().timestamp_millis();
        // Never move backwards if the local clock stepped back.
        self.last_modified_at = Some(self.last_modified_at.map_or(now, |prev| prev.max(now)));
    }

    /// "Title - Artist" label used in listings
    #[must_use]
    pub fn display_title(&self) -> String {
        match self.artist.as_deref() {
            Some(artist) if !artist.trim().is_empty() => format!("{} - {}", self.title, artist),
            _ => self.title.clone(),
        }
    }
}

impl SyncEntity for Chart {
    const KIND: RecordKind = RecordKind::Chart;

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
