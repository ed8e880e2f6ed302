//! Sync cycle orchestration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};

use super::{
    build_metadata, detect_conflicts, merge, ConflictDecision, ConflictResolver, ConflictSet,
    DeletionLog, MergeInput, MergedCollections, RecordKind, RemoteAdapter, RemoteBundle,
    RemoteMetadata, StorageInfo, SyncError, SyncPhase, SyncResult, SyncStateStore,
};
use crate::error::{Error, Result};
use crate::models::{Chart, SetList, SyncConfig, SyncMetadata};
use crate::util::unix_millis_now;

/// Runs sync cycles against one remote, one at a time.
///
/// The manager owns no entity state: callers pass the current local charts and
/// set-lists in and apply [`SyncResult::merged`] themselves on success.
pub struct SyncManager<A, L, S> {
    adapter: A,
    deletion_log: L,
    store: S,
    device_id: String,
    clock: fn() -> i64,
    syncing: AtomicBool,
    phase: Mutex<SyncPhase>,
}

/// How a cycle that did not error came to an end
enum CycleEnd {
    Completed,
    Cancelled,
}

/// Resolver for [`SyncManager::sync`], which never pauses
struct NoResolver;

impl ConflictResolver for NoResolver {
    async fn decide(&self, _conflicts: ConflictSet<'_>) -> ConflictDecision {
        ConflictDecision::Overwrite
    }
}

/// Holds the single-flight flag for the duration of a cycle
struct SyncGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SyncGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl<A, L, S> SyncManager<A, L, S>
where
    A: RemoteAdapter,
    L: DeletionLog,
    S: SyncStateStore,
{
    pub fn new(adapter: A, deletion_log: L, store: S, device_id: impl Into<String>) -> Self {
        Self {
            adapter,
            deletion_log,
            store,
            device_id: device_id.into(),
            clock: unix_millis_now,
            syncing: AtomicBool::new(false),
            phase: Mutex::new(SyncPhase::Idle),
        }
    }

    /// Replace the wall clock used to stamp merges and the sync watermark
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub const fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Phase of the current cycle, or how the last one ended
    pub fn phase(&self) -> SyncPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// Run one cycle, settling every conflict by last-write-wins.
    ///
    /// Failures are reported in the returned [`SyncResult`]; the only error
    /// returned directly is [`Error::AlreadySyncing`].
    pub async fn sync(&self, charts: &[Chart], set_lists: &[SetList]) -> Result<SyncResult> {
        self.run(charts, set_lists, &NoResolver).await
    }

    /// Run one cycle, asking `resolver` before overwriting conflicting changes
    /// (when conflict warnings are enabled).
    pub async fn sync_with_resolver<R: ConflictResolver>(
        &self,
        charts: &[Chart],
        set_lists: &[SetList],
        resolver: &R,
    ) -> Result<SyncResult> {
        self.run(charts, set_lists, resolver).await
    }

    pub fn is_authenticated(&self) -> bool {
        self.adapter.is_authenticated()
    }

    pub async fn authenticate(&self) -> Result<()> {
        self.adapter.authenticate().await
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.adapter.sign_out().await
    }

    pub async fn config(&self) -> Result<SyncConfig> {
        self.store.load_sync_config().await
    }

    pub async fn save_config(&self, config: &SyncConfig) -> Result<()> {
        self.store.save_sync_config(config).await
    }

    pub async fn last_sync_time(&self) -> Result<Option<i64>> {
        self.store.last_sync_time().await
    }

    pub async fn storage_info(&self) -> Result<StorageInfo> {
        self.adapter.storage_info().await
    }

    pub async fn remote_metadata(&self) -> Result<RemoteMetadata> {
        self.adapter.remote_metadata().await
    }

    pub async fn update_remote_metadata(
        &self,
        kind: RecordKind,
        id: &str,
        metadata: SyncMetadata,
    ) -> Result<()> {
        self.adapter.update_metadata(kind, id, metadata).await
    }

    async fn run<R: ConflictResolver>(
        &self,
        charts: &[Chart],
        set_lists: &[SetList],
        resolver: &R,
    ) -> Result<SyncResult> {
        let Some(_guard) = SyncGuard::acquire(&self.syncing) else {
            warn!("Sync requested while another sync is running");
            return Err(Error::AlreadySyncing);
        };

        let mut result = SyncResult::default();
        match self.run_cycle(charts, set_lists, resolver, &mut result).await {
            Ok(CycleEnd::Completed) => {
                result.success = true;
                self.set_phase(SyncPhase::Done);
                info!(
                    charts = result.synced_chart_ids.len(),
                    set_lists = result.synced_set_list_ids.len(),
                    conflicts = result.conflict_count(),
                    "Sync completed"
                );
            }
            Ok(CycleEnd::Cancelled) => {
                self.set_phase(SyncPhase::Cancelled);
                warn!(
                    conflicts = result.conflict_count(),
                    "Sync cancelled at conflict prompt"
                );
            }
            Err(error) => {
                self.set_phase(SyncPhase::Failed);
                let error = SyncError::from_error(&error);
                warn!(kind = ?error.kind, "Sync failed: {}", error.message);
                result.errors.push(error);
            }
        }
        Ok(result)
    }

    async fn run_cycle<R: ConflictResolver>(
        &self,
        charts: &[Chart],
        set_lists: &[SetList],
        resolver: &R,
        result: &mut SyncResult,
    ) -> Result<CycleEnd> {
        self.set_phase(SyncPhase::Pulling);
        info!("Pulling remote state");
        let remote = self.adapter.pull().await?;
        debug!(
            charts = remote.charts.len(),
            set_lists = remote.set_lists.len(),
            "Pulled remote state"
        );

        let config = self.store.load_sync_config().await?;
        let last_sync_time = self.store.last_sync_time().await?;
        let chart_metadata = build_metadata(charts, last_sync_time, &self.device_id);
        let set_list_metadata = build_metadata(set_lists, last_sync_time, &self.device_id);
        let deleted_charts = self.deletion_log.load_deleted_charts().await?;
        let deleted_set_lists = self.deletion_log.load_deleted_set_lists().await?;

        self.set_phase(SyncPhase::ConflictCheck);
        let watermark = last_sync_time.unwrap_or(0);
        result.chart_conflicts = detect_conflicts(
            charts,
            &remote.charts,
            &chart_metadata,
            &remote.chart_metadata,
            watermark,
        );
        result.set_list_conflicts = detect_conflicts(
            set_lists,
            &remote.set_lists,
            &set_list_metadata,
            &remote.set_list_metadata,
            watermark,
        );
        result.metadata_conflicts = result
            .chart_conflicts
            .iter()
            .map(|conflict| conflict.to_metadata_conflict())
            .chain(
                result
                    .set_list_conflicts
                    .iter()
                    .map(|conflict| conflict.to_metadata_conflict()),
            )
            .collect();

        if result.has_conflicts() && config.show_conflict_warning {
            self.set_phase(SyncPhase::AwaitingDecision);
            info!(conflicts = result.conflict_count(), "Awaiting conflict decision");
            let decision = resolver
                .decide(ConflictSet {
                    charts: &result.chart_conflicts,
                    set_lists: &result.set_list_conflicts,
                })
                .await;
            if decision == ConflictDecision::Cancel {
                return Ok(CycleEnd::Cancelled);
            }
        }

        self.set_phase(SyncPhase::Merging);
        let now = (self.clock)();
        let merged_charts = merge(
            MergeInput {
                local: charts,
                remote: &remote.charts,
                local_metadata: &chart_metadata,
                remote_metadata: &remote.chart_metadata,
                local_tombstones: &deleted_charts,
                remote_tombstones: &remote.deleted_charts,
            },
            now,
        );
        let merged_set_lists = merge(
            MergeInput {
                local: set_lists,
                remote: &remote.set_lists,
                local_metadata: &set_list_metadata,
                remote_metadata: &remote.set_list_metadata,
                local_tombstones: &deleted_set_lists,
                remote_tombstones: &remote.deleted_set_lists,
            },
            now,
        );

        self.set_phase(SyncPhase::Pushing);
        let bundle = RemoteBundle {
            charts: merged_charts.entities.clone(),
            set_lists: merged_set_lists.entities.clone(),
            chart_metadata: merged_charts.metadata.clone(),
            set_list_metadata: merged_set_lists.metadata.clone(),
            deleted_charts: merged_charts.tombstones.clone(),
            deleted_set_lists: merged_set_lists.tombstones.clone(),
        };
        info!(
            charts = bundle.charts.len(),
            set_lists = bundle.set_lists.len(),
            "Pushing merged state"
        );
        self.adapter.push(&bundle).await?;

        // The watermark never moves backwards, even if the clock does.
        let completed_at = last_sync_time.map_or(now, |previous| previous.max(now));
        self.store.set_last_sync_time(completed_at).await?;

        result.synced_chart_ids = merged_charts.entity_ids();
        result.synced_set_list_ids = merged_set_lists.entity_ids();
        result.merged = Some(MergedCollections {
            charts: merged_charts,
            set_lists: merged_set_lists,
        });
        Ok(CycleEnd::Completed)
    }

    fn set_phase(&self, phase: SyncPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    use super::*;
    use crate::db::{
        Database, LibSqlChartRepository, LibSqlDeletionLog, LibSqlSettingsRepository,
        RecordRepository,
    };
    use crate::models::{DeletedChart, DeletedRecord, DeletedSetList, MetadataMap};
    use crate::remote::{FolderRemote, MemoryRemote};
    use crate::sync::SyncErrorKind;

    const NOW: i64 = 1_000;

    fn frozen_clock() -> i64 {
        NOW
    }

    fn chart(id: &str, title: &str, modified: i64) -> Chart {
        let mut chart = Chart::new(title, "[G] Amazing [C] grace");
        chart.id = id.to_string();
        chart.created_at = 1;
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

    fn remote_with_chart(chart: Chart) -> RemoteBundle {
        let mut chart_metadata = MetadataMap::new();
        chart_metadata.insert(
            chart.id.clone(),
            meta(chart.last_modified_at.unwrap_or(chart.created_at), "device-b"),
        );
        RemoteBundle {
            charts: vec![chart],
            chart_metadata,
            ..RemoteBundle::default()
        }
    }

    fn manager<A: RemoteAdapter>(
        db: &Database,
        adapter: A,
    ) -> SyncManager<A, LibSqlDeletionLog<'_>, LibSqlSettingsRepository<'_>> {
        SyncManager::new(
            adapter,
            LibSqlDeletionLog::new(db.connection()),
            LibSqlSettingsRepository::new(db.connection()),
            "device-a",
        )
        .with_clock(frozen_clock)
    }

    fn cancel(_conflicts: ConflictSet<'_>) -> ConflictDecision {
        ConflictDecision::Cancel
    }

    fn overwrite(_conflicts: ConflictSet<'_>) -> ConflictDecision {
        ConflictDecision::Overwrite
    }

    /// Counts how often it was asked
    #[derive(Default)]
    struct CountingResolver {
        calls: AtomicUsize,
    }

    impl ConflictResolver for CountingResolver {
        async fn decide(&self, _conflicts: ConflictSet<'_>) -> ConflictDecision {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ConflictDecision::Cancel
        }
    }

    struct BrokenLog;

    impl DeletionLog for BrokenLog {
        async fn load_deleted_charts(&self) -> Result<Vec<DeletedChart>> {
            Err(Error::Storage("deletion log unavailable".to_string()))
        }

        async fn load_deleted_set_lists(&self) -> Result<Vec<DeletedSetList>> {
            Ok(Vec::new())
        }
    }

    /// Remote whose pull blocks until released
    struct GatedRemote {
        inner: MemoryRemote,
        entered: Notify,
        release: Notify,
    }

    impl RemoteAdapter for GatedRemote {
        fn is_authenticated(&self) -> bool {
            self.inner.is_authenticated()
        }

        async fn authenticate(&self) -> Result<()> {
            self.inner.authenticate().await
        }

        async fn sign_out(&self) -> Result<()> {
            self.inner.sign_out().await
        }

        async fn pull(&self) -> Result<RemoteBundle> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.pull().await
        }

        async fn push(&self, bundle: &RemoteBundle) -> Result<()> {
            self.inner.push(bundle).await
        }

        async fn update_metadata(
            &self,
            kind: RecordKind,
            id: &str,
            metadata: SyncMetadata,
        ) -> Result<()> {
            self.inner.update_metadata(kind, id, metadata).await
        }

        async fn storage_info(&self) -> Result<StorageInfo> {
            self.inner.storage_info().await
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn first_sync_pushes_local_state() {
        let db = Database::open_in_memory().await.unwrap();
        let manager = manager(&db, MemoryRemote::new());
        let charts = vec![chart("a", "Amazing Grace", 100)];
        let set_lists = vec![SetList::new("Sunday").with_charts(["a".to_string()])];

        let result = manager.sync(&charts, &set_lists).await.unwrap();

        assert!(result.success);
        assert!(result.errors.is_empty());
        assert_eq!(result.synced_chart_ids, vec!["a"]);
        assert_eq!(result.synced_set_list_ids, vec![set_lists[0].id.clone()]);
        assert_eq!(manager.phase(), SyncPhase::Done);
        assert!(!manager.is_syncing());
        assert_eq!(manager.last_sync_time().await.unwrap(), Some(NOW));

        let remote = manager.adapter().snapshot().unwrap();
        assert_eq!(remote.charts, charts);
        assert_eq!(remote.set_lists, set_lists);
        assert_eq!(remote.chart_metadata["a"].last_synced_at, NOW);
        assert_eq!(remote.chart_metadata["a"].device_id, "device-a");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn resync_without_changes_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        let remote = MemoryRemote::with_bundle(remote_with_chart(chart("r", "Remote", 50)));
        let manager = manager(&db, remote);

        let first = manager
            .sync(&[chart("a", "Local", 100)], &[])
            .await
            .unwrap();
        let merged = first.merged.clone().unwrap();
        let second = manager
            .sync_with_resolver(&merged.charts.entities, &merged.set_lists.entities, &cancel)
            .await
            .unwrap();

        assert!(second.success);
        assert!(!second.has_conflicts());
        let again = second.merged.unwrap();
        assert_eq!(again.charts.entities, merged.charts.entities);
        assert_eq!(again.charts.tombstones, merged.charts.tombstones);
        assert_eq!(again.charts.metadata.keys().collect::<Vec<_>>(), vec!["a", "r"]);
        assert_eq!(manager.adapter().push_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancel_leaves_remote_and_watermark_untouched() {
        let db = Database::open_in_memory().await.unwrap();
        let store = LibSqlSettingsRepository::new(db.connection());
        store.set_last_sync_time(100).await.unwrap();

        let remote_bundle = remote_with_chart(chart("a", "Remote edit", 300));
        let manager = manager(&db, MemoryRemote::with_bundle(remote_bundle.clone()));

        let result = manager
            .sync_with_resolver(&[chart("a", "Local edit", 200)], &[], &cancel)
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.errors.is_empty());
        assert!(result.merged.is_none());
        assert_eq!(result.chart_conflicts.len(), 1);
        assert_eq!(result.metadata_conflicts[0].kind, RecordKind::Chart);
        assert_eq!(result.metadata_conflicts[0].id, "a");
        assert_eq!(manager.phase(), SyncPhase::Cancelled);
        assert_eq!(manager.adapter().push_count(), 0);
        assert_eq!(manager.adapter().snapshot().unwrap(), remote_bundle);
        assert_eq!(manager.last_sync_time().await.unwrap(), Some(100));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn overwrite_settles_conflict_by_last_write() {
        let db = Database::open_in_memory().await.unwrap();
        LibSqlSettingsRepository::new(db.connection())
            .set_last_sync_time(100)
            .await
            .unwrap();
        let manager = manager(
            &db,
            MemoryRemote::with_bundle(remote_with_chart(chart("a", "Remote edit", 300))),
        );

        let result = manager
            .sync_with_resolver(&[chart("a", "Local edit", 200)], &[], &overwrite)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.conflict_count(), 1);
        let merged = result.merged.unwrap();
        assert_eq!(merged.charts.entities[0].title, "Remote edit");
        assert_eq!(manager.last_sync_time().await.unwrap(), Some(NOW));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn resolver_is_skipped_when_warnings_are_off() {
        let db = Database::open_in_memory().await.unwrap();
        let store = LibSqlSettingsRepository::new(db.connection());
        store.set_last_sync_time(100).await.unwrap();
        store
            .save_sync_config(&SyncConfig {
                auto_sync: false,
                show_conflict_warning: false,
            })
            .await
            .unwrap();
        let manager = manager(
            &db,
            MemoryRemote::with_bundle(remote_with_chart(chart("a", "Remote edit", 300))),
        );
        let resolver = CountingResolver::default();

        let result = manager
            .sync_with_resolver(&[chart("a", "Local edit", 200)], &[], &resolver)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.conflict_count(), 1);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn resolver_is_skipped_without_conflicts() {
        let db = Database::open_in_memory().await.unwrap();
        let manager = manager(&db, MemoryRemote::new());
        let resolver = CountingResolver::default();

        let result = manager
            .sync_with_resolver(&[chart("a", "Local", 200)], &[], &resolver)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_sync_is_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let manager = manager(
            &db,
            GatedRemote {
                inner: MemoryRemote::new(),
                entered: Notify::new(),
                release: Notify::new(),
            },
        );
        let charts = vec![chart("a", "Local", 100)];

        let first = manager.sync(&charts, &[]);
        let second = async {
            manager.adapter().entered.notified().await;
            assert!(manager.is_syncing());
            let second = manager.sync(&charts, &[]).await;
            manager.adapter().release.notify_one();
            second
        };
        let (first, second) = tokio::join!(first, second);

        assert!(matches!(second, Err(Error::AlreadySyncing)));
        let first = first.unwrap();
        assert!(first.success);
        assert_eq!(first.synced_chart_ids, vec!["a"]);
        assert!(!manager.is_syncing());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn offline_remote_is_network_error() {
        let db = Database::open_in_memory().await.unwrap();
        let remote = MemoryRemote::new();
        remote.set_offline(true);
        let manager = manager(&db, remote);

        let result = manager.sync(&[chart("a", "Local", 100)], &[]).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, SyncErrorKind::Network);
        assert_eq!(manager.phase(), SyncPhase::Failed);
        assert_eq!(manager.last_sync_time().await.unwrap(), None);
        assert!(!manager.is_syncing());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_push_after_pull_keeps_watermark() {
        let db = Database::open_in_memory().await.unwrap();
        LibSqlSettingsRepository::new(db.connection())
            .set_last_sync_time(100)
            .await
            .unwrap();
        let remote_bundle = remote_with_chart(chart("r", "Remote", 50));
        let remote = MemoryRemote::with_bundle(remote_bundle.clone());
        remote.set_rejecting_pushes(true);
        let manager = manager(&db, remote);

        let result = manager.sync(&[chart("a", "Local", 300)], &[]).await.unwrap();

        assert!(!result.success);
        assert!(result.merged.is_none());
        assert!(result.synced_chart_ids.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, SyncErrorKind::Network);
        assert_eq!(manager.phase(), SyncPhase::Failed);
        assert_eq!(manager.last_sync_time().await.unwrap(), Some(100));
        assert_eq!(manager.adapter().snapshot().unwrap(), remote_bundle);
        assert!(!manager.is_syncing());

        manager.adapter().set_rejecting_pushes(false);
        let retried = manager.sync(&[chart("a", "Local", 300)], &[]).await.unwrap();
        assert!(retried.success);
        assert_eq!(manager.last_sync_time().await.unwrap(), Some(NOW));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_remote_document_is_named_in_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("charts.json"), "[{").unwrap();
        let db = Database::open_in_memory().await.unwrap();
        let manager = manager(&db, FolderRemote::connected(tmp.path()));

        let result = manager.sync(&[], &[]).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.errors[0].kind, SyncErrorKind::Unknown);
        assert_eq!(result.errors[0].id.as_deref(), Some("charts.json"));
        assert_eq!(manager.last_sync_time().await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn signed_out_remote_is_auth_error() {
        let db = Database::open_in_memory().await.unwrap();
        let manager = manager(&db, MemoryRemote::new());
        manager.sign_out().await.unwrap();
        assert!(!manager.is_authenticated());

        let result = manager.sync(&[], &[]).await.unwrap();
        assert_eq!(result.errors[0].kind, SyncErrorKind::Auth);

        manager.authenticate().await.unwrap();
        assert!(manager.sync(&[], &[]).await.unwrap().success);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn deletion_log_failure_is_storage_error() {
        let db = Database::open_in_memory().await.unwrap();
        let manager = SyncManager::new(
            MemoryRemote::new(),
            BrokenLog,
            LibSqlSettingsRepository::new(db.connection()),
            "device-a",
        );

        let result = manager.sync(&[chart("a", "Local", 100)], &[]).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.errors[0].kind, SyncErrorKind::Storage);
        assert_eq!(manager.adapter().push_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn newer_local_edit_wins_without_conflict() {
        let db = Database::open_in_memory().await.unwrap();
        LibSqlSettingsRepository::new(db.connection())
            .set_last_sync_time(100)
            .await
            .unwrap();
        let manager = manager(
            &db,
            MemoryRemote::with_bundle(remote_with_chart(chart("a", "Old", 100))),
        );

        let result = manager
            .sync_with_resolver(&[chart("a", "New", 300)], &[], &cancel)
            .await
            .unwrap();

        assert!(result.success);
        assert!(!result.has_conflicts());
        assert_eq!(result.merged.unwrap().charts.entities[0].title, "New");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn local_tombstone_beats_newer_remote_copy() {
        let db = Database::open_in_memory().await.unwrap();
        let charts = LibSqlChartRepository::new(db.connection());
        charts.upsert(&chart("b", "Doomed", 100)).await.unwrap();
        charts.delete("b", 300, "device-a").await.unwrap();

        let manager = manager(
            &db,
            MemoryRemote::with_bundle(remote_with_chart(chart("b", "Edited remotely", 400))),
        );

        let result = manager.sync(&[], &[]).await.unwrap();

        assert!(result.success);
        let merged = result.merged.unwrap();
        assert!(merged.charts.entities.is_empty());
        assert!(!merged.charts.metadata.contains_key("b"));

        let remote = manager.adapter().snapshot().unwrap();
        assert!(remote.charts.is_empty());
        assert_eq!(
            remote.deleted_charts,
            vec![DeletedRecord::new("b", 300, "device-a")]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn pass_through_operations() {
        let db = Database::open_in_memory().await.unwrap();
        let manager = manager(&db, MemoryRemote::new());

        let config = SyncConfig {
            auto_sync: true,
            show_conflict_warning: true,
        };
        manager.save_config(&config).await.unwrap();
        assert_eq!(manager.config().await.unwrap(), config);
        assert_eq!(manager.device_id(), "device-a");
        assert_eq!(manager.phase(), SyncPhase::Idle);

        manager
            .update_remote_metadata(RecordKind::SetList, "s", meta(5, "device-a"))
            .await
            .unwrap();
        let metadata = manager.remote_metadata().await.unwrap();
        assert_eq!(metadata.set_lists["s"].last_modified_at, 5);
        assert!(manager.storage_info().await.unwrap().total.is_none());
    }
}
