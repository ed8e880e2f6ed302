//! Data models for Chordbook

mod chart;
mod deleted_record;
mod set_list;
mod sync_config;
mod sync_conflict;
mod sync_metadata;

pub use chart::Chart;
pub use deleted_record::{DeletedChart, DeletedRecord, DeletedSetList};
pub use set_list::SetList;
pub use sync_config::SyncConfig;
pub use sync_conflict::{MetadataConflict, SyncConflict};
pub use sync_metadata::{MetadataMap, SyncMetadata};

/// Mint a new record identifier (UUID v7, time-sortable)
#[must_use]
pub fn new_record_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
