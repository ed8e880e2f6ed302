//! Conflict detection

use std::collections::HashMap;

use tracing::debug;

use super::SyncEntity;
use crate::models::{MetadataMap, SyncConflict};

/// Find records that both sides changed since `last_sync_time`.
///
/// A pair conflicts only when *both* modification times are strictly newer
/// than the watermark. Pairs missing metadata on either side have never been
/// synced together and are skipped. Output is ordered by id.
pub fn detect_conflicts<T: SyncEntity>(
    local: &[T],
    remote: &[T],
    local_metadata: &MetadataMap,
    remote_metadata: &MetadataMap,
    last_sync_time: i64,
) -> Vec<SyncConflict<T>> {
    let remote_by_id = remote
        .iter()
        .map(|entity| (entity.id(), entity))
        .collect::<HashMap<_, _>>();

    let mut conflicts = local
        .iter()
        .filter_map(|local_entity| {
            let id = local_entity.id();
            let remote_entity = remote_by_id.get(id)?;
            let local_meta = local_metadata.get(id)?;
            let remote_meta = remote_metadata.get(id)?;

            let local_changed = local_meta.last_modified_at > last_sync_time;
            let remote_changed = remote_meta.last_modified_at > last_sync_time;
            (local_changed && remote_changed).then(|| SyncConflict {
                local_entity: local_entity.clone(),
                remote_entity: (*remote_entity).clone(),
                local_metadata: local_meta.clone(),
                remote_metadata: remote_meta.clone(),
            })
        })
        .collect::<Vec<_>>();
    conflicts.sort_by(|a, b| a.local_entity.id().cmp(b.local_entity.id()));

    if !conflicts.is_empty() {
        debug!(kind = %T::KIND, count = conflicts.len(), "Detected sync conflicts");
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chart, SyncMetadata};

    fn chart(id: &str, modified: i64) -> Chart {
        let mut chart = Chart::new(id, "");
        chart.id = id.to_string();
        chart.created_at = 0;
        chart.last_modified_at = Some(modified);
        chart
    }

    fn meta(modified: i64, device: &str) -> SyncMetadata {
        SyncMetadata {
            last_synced_at: 0,
            last_modified_at: modified,
            device_id: device.to_string(),
            remote_id: None,
        }
    }

    fn metadata_for(charts: &[Chart], device: &str) -> MetadataMap {
        charts
            .iter()
            .map(|chart| (chart.id.clone(), meta(chart.modified_at(), device)))
            .collect()
    }

    fn conflict_ids(conflicts: &[SyncConflict<Chart>]) -> Vec<String> {
        conflicts.iter().map(|c| c.id().to_string()).collect()
    }

    #[test]
    fn both_sides_changed_is_a_conflict() {
        let local = vec![chart("a", 300)];
        let remote = vec![chart("a", 200)];
        let conflicts = detect_conflicts(
            &local,
            &remote,
            &metadata_for(&local, "l"),
            &metadata_for(&remote, "r"),
            100,
        );
        assert_eq!(conflict_ids(&conflicts), vec!["a"]);
        assert_eq!(conflicts[0].local_entity.last_modified_at, Some(300));
        assert_eq!(conflicts[0].remote_entity.last_modified_at, Some(200));
    }

    #[test]
    fn only_one_side_changed_is_not_a_conflict() {
        // Remote unchanged since the watermark, local edited afterwards.
        let local = vec![chart("a", 300), chart("b", 50)];
        let remote = vec![chart("a", 100), chart("b", 400)];
        let conflicts = detect_conflicts(
            &local,
            &remote,
            &metadata_for(&local, "l"),
            &metadata_for(&remote, "r"),
            100,
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn timestamp_equal_to_watermark_is_unchanged() {
        let local = vec![chart("a", 100)];
        let remote = vec![chart("a", 150)];
        let conflicts = detect_conflicts(
            &local,
            &remote,
            &metadata_for(&local, "l"),
            &metadata_for(&remote, "r"),
            100,
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn missing_metadata_skips_the_pair() {
        let local = vec![chart("a", 300)];
        let remote = vec![chart("a", 200)];
        let conflicts = detect_conflicts(
            &local,
            &remote,
            &metadata_for(&local, "l"),
            &MetadataMap::new(),
            100,
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn local_only_records_never_conflict() {
        let local = vec![chart("a", 300)];
        let conflicts = detect_conflicts(
            &local,
            &[],
            &metadata_for(&local, "l"),
            &MetadataMap::new(),
            0,
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn detection_is_symmetric() {
        let left = vec![chart("a", 300), chart("b", 90), chart("c", 500), chart("d", 120)];
        let right = vec![chart("a", 250), chart("b", 400), chart("c", 110), chart("e", 999)];
        let left_meta = metadata_for(&left, "l");
        let right_meta = metadata_for(&right, "r");

        let forward = detect_conflicts(&left, &right, &left_meta, &right_meta, 100);
        let backward = detect_conflicts(&right, &left, &right_meta, &left_meta, 100);

        assert_eq!(conflict_ids(&forward), vec!["a", "c"]);
        assert_eq!(conflict_ids(&forward), conflict_ids(&backward));
    }

    #[test]
    fn output_is_ordered_by_id() {
        let local = vec![chart("z", 300), chart("m", 300), chart("b", 300)];
        let remote = local.clone();
        let meta = metadata_for(&local, "x");
        let conflicts = detect_conflicts(&local, &remote, &meta, &meta, 0);
        assert_eq!(conflict_ids(&conflicts), vec!["b", "m", "z"]);
    }
}
