//! Deletion-aware last-write-wins merge

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SyncEntity;
use crate::models::{DeletedRecord, MetadataMap};

/// Both sides of one record kind, as seen at the start of a merge
#[derive(Debug, Clone, Copy)]
pub struct MergeInput<'a, T> {
    pub local: &'a [T],
    pub remote: &'a [T],
    pub local_metadata: &'a MetadataMap,
    pub remote_metadata: &'a MetadataMap,
    pub local_tombstones: &'a [DeletedRecord],
    pub remote_tombstones: &'a [DeletedRecord],
}

/// Merged state of one record kind, ready to push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome<T> {
    /// Surviving entities, ordered by id
    pub entities: Vec<T>,
    /// Winning metadata, stamped with the merge time
    pub metadata: MetadataMap,
    /// Union of both deletion logs, ordered by id
    pub tombstones: Vec<DeletedRecord>,
}

impl<T> Default for MergeOutcome<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            metadata: MetadataMap::new(),
            tombstones: Vec::new(),
        }
    }
}

impl<T: SyncEntity> MergeOutcome<T> {
    /// Ids of the surviving entities
    pub fn entity_ids(&self) -> Vec<String> {
        self.entities
            .iter()
            .map(|entity| entity.id().to_string())
            .collect()
    }
}

/// Merge one record kind.
///
/// Tombstones from either side dominate live copies, whatever their
/// timestamps. Among live records the later `last_modified_at` wins and the
/// local copy wins ties. Every surviving metadata record is stamped with
/// `now` as its `last_synced_at`.
pub fn merge<T: SyncEntity>(input: MergeInput<'_, T>, now: i64) -> MergeOutcome<T> {
    let tombstones = union_tombstones(input.local_tombstones, input.remote_tombstones);
    let deleted = tombstones.keys().cloned().collect::<HashSet<_>>();

    let mut entities = input
        .remote
        .iter()
        .filter(|entity| !deleted.contains(entity.id()))
        .map(|entity| (entity.id().to_string(), entity.clone()))
        .collect::<BTreeMap<_, _>>();

    let remote_ids = input
        .remote
        .iter()
        .map(|entity| entity.id())
        .collect::<HashSet<_>>();

    for entity in input.local {
        let id = entity.id();
        if deleted.contains(id) {
            continue;
        }

        let keep_local = if remote_ids.contains(id) {
            match (input.local_metadata.get(id), input.remote_metadata.get(id)) {
                (Some(local_meta), Some(remote_meta)) => {
                    local_meta.last_modified_at >= remote_meta.last_modified_at
                }
                _ => true,
            }
        } else {
            true
        };

        if keep_local {
            entities.insert(id.to_string(), entity.clone());
        }
    }

    let metadata = merge_metadata(input.local_metadata, input.remote_metadata, &deleted, now);

    debug!(
        kind = %T::KIND,
        entities = entities.len(),
        tombstones = tombstones.len(),
        "Merged records"
    );

    MergeOutcome {
        entities: entities.into_values().collect(),
        metadata,
        tombstones: tombstones.into_values().collect(),
    }
}

/// Union keyed by id; the later `deleted_at` wins, local on ties.
fn union_tombstones(
    local: &[DeletedRecord],
    remote: &[DeletedRecord],
) -> BTreeMap<String, DeletedRecord> {
    let mut union = remote
        .iter()
        .map(|record| (record.id.clone(), record.clone()))
        .collect::<BTreeMap<_, _>>();

    for record in local {
        let replace = union
            .get(&record.id)
            .is_none_or(|existing| record.deleted_at >= existing.deleted_at);
        if replace {
            union.insert(record.id.clone(), record.clone());
        }
    }
    union
}

fn merge_metadata(
    local: &MetadataMap,
    remote: &MetadataMap,
    deleted: &HashSet<String>,
    now: i64,
) -> MetadataMap {
    let mut merged = remote
        .iter()
        .filter(|(id, _)| !deleted.contains(*id))
        .map(|(id, meta)| (id.clone(), meta.clone()))
        .collect::<MetadataMap>();

    for (id, local_meta) in local {
        if deleted.contains(id) {
            continue;
        }
        let keep_local = merged
            .get(id)
            .is_none_or(|remote_meta| {
                local_meta.last_modified_at >= remote_meta.last_modified_at
            });
        if keep_local {
            let remote_id = merged.get(id).and_then(|remote_meta| remote_meta.remote_id.clone());
            let mut meta = local_meta.clone();
            // A backend id learned from the remote must survive a local win.
            if meta.remote_id.is_none() {
                meta.remote_id = remote_id;
            }
            merged.insert(id.clone(), meta);
        }
    }

    for meta in merged.values_mut() {
        meta.last_synced_at = meta.last_synced_at.max(now);
    }
    merged
}
