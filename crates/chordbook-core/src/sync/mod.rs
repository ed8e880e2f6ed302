//! Last-write-wins synchronization engine.
//!
//! One cycle pulls the remote bundle, detects records both sides changed since
//! the last successful sync, optionally asks the caller how to proceed, merges
//! charts and set-lists (entities, metadata and tombstones) and pushes the
//! merged bundle back. [`SyncManager`] is the entry point; the remaining
//! modules are pure building blocks it composes.

mod adapter;
mod conflict;
mod deletion_log;
mod entity;
mod lock;
mod manager;
mod merge;
mod metadata;
mod resolver;
mod result;
mod state;
mod state_store;

pub use adapter::{RemoteAdapter, RemoteBundle, RemoteMetadata, StorageInfo};
pub use conflict::detect_conflicts;
pub use deletion_log::DeletionLog;
pub use entity::{RecordKind, SyncEntity};
pub use lock::SyncLock;
pub use manager::SyncManager;
pub use merge::{merge, MergeInput, MergeOutcome};
pub use metadata::build_metadata;
pub use resolver::{ConflictDecision, ConflictResolver, ConflictSet};
pub use result::{MergedCollections, SyncError, SyncErrorKind, SyncResult};
pub use state::SyncPhase;
pub use state_store::SyncStateStore;
