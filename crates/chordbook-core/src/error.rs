//! Error types for chordbook-core

use thiserror::Error;

/// Result type alias using chordbook-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in chordbook-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local persistence error outside the database (deletion log, state slot)
    #[error("Storage error: {0}")]
    Storage(String),

    /// The remote adapter has no usable session
    #[error("Remote is not authenticated")]
    NotAuthenticated,

    /// Transport-level failure talking to the remote
    #[error("Network error: {0}")]
    Network(String),

    /// A remote document exists but cannot be decoded
    #[error("Malformed remote document {document}: {reason}")]
    MalformedDocument { document: String, reason: String },

    /// Any other failure reported by a remote adapter
    #[error("Remote error: {0}")]
    Remote(String),

    /// A sync cycle is already in flight, in this process or another
    #[error("A sync is already in progress")]
    AlreadySyncing,
}
