//! Local metadata derivation

use tracing::debug;

use super::SyncEntity;
use crate::models::{MetadataMap, SyncMetadata};

/// Derive sync metadata for every local entity of one kind.
///
/// `last_synced_at` carries the previous watermark (0 when this device has
/// never synced); `last_modified_at` is the entity's own modification time.
pub fn build_metadata<T: SyncEntity>(
    entities: &[T],
    last_sync_time: Option<i64>,
    device_id: &str,
) -> MetadataMap {
    let last_synced_at = last_sync_time.unwrap_or(0);
    let metadata = entities
        .iter()
        .map(|entity| {
            (
                entity.id().to_string(),
                SyncMetadata {
                    last_synced_at,
                    last_modified_at: entity.modified_at(),
                    device_id: device_id.to_string(),
                    remote_id: None,
                },
            )
        })
        .collect::<MetadataMap>();
    debug!(kind = %T::KIND, count = metadata.len(), "Built local metadata");
    metadata
}
