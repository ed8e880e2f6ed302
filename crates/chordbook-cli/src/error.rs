use std::io;

use chordbook_core::sync::RecordKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] chordbook_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Chart title cannot be empty")]
    EmptyTitle,
    #[error("Set-list name cannot be empty")]
    EmptyName,
    #[error("ID cannot be empty")]
    EmptyId,
    #[error("No {kind} found for id/prefix: {query}")]
    NotFound { kind: RecordKind, query: String },
    #[error("{0}")]
    AmbiguousId(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("No remote folder connected. Run `chordbook remote connect <PATH>` or set CHORDBOOK_REMOTE_DIR.")]
    RemoteNotConfigured,
    #[error("Sync failed: {0}")]
    SyncFailed(String),
}
