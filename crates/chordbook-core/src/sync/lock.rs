//! Cross-process exclusion for sync cycles.
//!
//! The in-memory flag on [`SyncManager`](super::SyncManager) only covers one
//! manager. Every CLI invocation builds its own manager, so cycles against the
//! same database also take an advisory lock on a file next to it.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Exclusive advisory lock held for the duration of one sync cycle.
///
/// Released when dropped, or by the OS when the process exits.
#[derive(Debug)]
pub struct SyncLock {
    file: File,
    path: PathBuf,
}

impl SyncLock {
    /// Lock file used for the database at `db_path`
    pub fn lock_path(db_path: &Path) -> PathBuf {
        let mut name = db_path.as_os_str().to_owned();
        name.push(".sync.lock");
        PathBuf::from(name)
    }

    /// Take the lock without waiting. A held lock is [`Error::AlreadySyncing`].
    pub fn acquire(db_path: &Path) -> Result<Self> {
        let path = Self::lock_path(db_path);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!("Acquired sync lock {}", path.display());
                Ok(Self { file, path })
            }
            Err(error) if error.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                warn!("Sync lock {} is held by another sync", path.display());
                Err(Error::AlreadySyncing)
            }
            Err(error) => Err(Error::Io(error)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SyncLock {
    fn drop(&mut self) {
        if let Err(error) = FileExt::unlock(&self.file) {
            warn!("Failed to release sync lock {}: {error}", self.path.display());
        }
    }
}
