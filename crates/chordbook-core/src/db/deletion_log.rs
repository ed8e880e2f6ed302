//! libSQL-backed deletion log

use libsql::Connection;

use super::record_repository::load_tombstones;
use crate::error::Result;
use crate::models::{DeletedChart, DeletedSetList};
use crate::sync::{DeletionLog, RecordKind};

/// Reads the tombstone tables written by local deletes
pub struct LibSqlDeletionLog<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlDeletionLog<'a> {
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl DeletionLog for LibSqlDeletionLog<'_> {
    async fn load_deleted_charts(&self) -> Result<Vec<DeletedChart>> {
        load_tombstones(self.conn, RecordKind::Chart).await
    }

    async fn load_deleted_set_lists(&self) -> Result<Vec<DeletedSetList>> {
        load_tombstones(self.conn, RecordKind::SetList).await
    }
}
