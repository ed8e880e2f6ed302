//! In-process remote, used by tests and offline demos.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::models::SyncMetadata;
use crate::sync::{RecordKind, RemoteAdapter, RemoteBundle, StorageInfo};

/// Remote whose whole state lives in memory
#[derive(Debug)]
pub struct MemoryRemote {
    bundle: Mutex<RemoteBundle>,
    authenticated: AtomicBool,
    offline: AtomicBool,
    rejecting_pushes: AtomicBool,
    pushes: AtomicUsize,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    /// An empty, already authenticated remote
    pub fn new() -> Self {
        Self::with_bundle(RemoteBundle::default())
    }

    /// An authenticated remote pre-populated with `bundle`
    pub fn with_bundle(bundle: RemoteBundle) -> Self {
        Self {
            bundle: Mutex::new(bundle),
            authenticated: AtomicBool::new(true),
            offline: AtomicBool::new(false),
            rejecting_pushes: AtomicBool::new(false),
            pushes: AtomicUsize::new(0),
        }
    }

    /// Copy of the current remote state
    pub fn snapshot(&self) -> Result<RemoteBundle> {
        Ok(self.lock()?.clone())
    }

    /// Number of successful pushes so far
    pub fn push_count(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }

    /// Simulate losing (or regaining) connectivity
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail every push while pulls keep working
    pub fn set_rejecting_pushes(&self, rejecting: bool) {
        self.rejecting_pushes.store(rejecting, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> Result<()> {
        if !self.is_authenticated() {
            return Err(Error::NotAuthenticated);
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network("failed to connect to memory remote".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, RemoteBundle>> {
        self.bundle
            .lock()
            .map_err(|_| Error::Remote("memory remote state is poisoned".to_string()))
    }
}

impl RemoteAdapter for MemoryRemote {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn authenticate(&self) -> Result<()> {
        self.authenticated.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.authenticated.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn pull(&self) -> Result<RemoteBundle> {
        self.check_reachable()?;
        self.snapshot()
    }

    async fn push(&self, bundle: &RemoteBundle) -> Result<()> {
        self.check_reachable()?;
        if self.rejecting_pushes.load(Ordering::SeqCst) {
            return Err(Error::Network("connection reset while pushing".to_string()));
        }
        *self.lock()? = bundle.clone();
        self.pushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_metadata(
        &self,
        kind: RecordKind,
        id: &str,
        metadata: SyncMetadata,
    ) -> Result<()> {
        self.check_reachable()?;
        let mut bundle = self.lock()?;
        let map = match kind {
            RecordKind::Chart => &mut bundle.chart_metadata,
            RecordKind::SetList => &mut bundle.set_list_metadata,
        };
        map.insert(id.to_string(), metadata);
        Ok(())
    }

    async fn storage_info(&self) -> Result<StorageInfo> {
        self.check_reachable()?;
        let used = serde_json::to_vec(&*self.lock()?)?.len();
        Ok(StorageInfo {
            used: u64::try_from(used).unwrap_or(u64::MAX),
            total: None,
        })
    }
}
