//! Chart and set-list repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT

use std::marker::PhantomData;

use libsql::Connection;

use crate::error::{Error, Result};
use crate::models::{Chart, DeletedRecord, SetList};
use crate::sync::{MergeOutcome, RecordKind, SyncEntity};

/// Trait for entity storage operations (async)
#[allow(async_fn_in_trait)]
pub trait RecordRepository<T: SyncEntity> {
    /// List all live records, most recently modified first
    async fn list(&self) -> Result<Vec<T>>;

    /// Get a record by ID
    async fn get(&self, id: &str) -> Result<Option<T>>;

    /// IDs starting with `prefix`, at most `limit` of them
    async fn list_ids_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>>;

    /// Insert or replace a record
    async fn upsert(&self, entity: &T) -> Result<()>;

    /// Remove a record and append its tombstone, atomically
    async fn delete(&self, id: &str, deleted_at: i64, device_id: &str) -> Result<DeletedRecord>;

    /// All tombstones recorded for this kind, ordered by ID
    async fn tombstones(&self) -> Result<Vec<DeletedRecord>>;

    /// Replace local state with the output of a successful sync
    async fn apply_merged(&self, outcome: &MergeOutcome<T>) -> Result<()>;
}

/// libSQL implementation of `RecordRepository`, one table pair per kind
pub struct LibSqlRecordRepository<'a, T> {
    conn: &'a Connection,
    _kind: PhantomData<T>,
}

/// Chart storage
pub type LibSqlChartRepository<'a> = LibSqlRecordRepository<'a, Chart>;

/// Set-list storage
pub type LibSqlSetListRepository<'a> = LibSqlRecordRepository<'a, SetList>;

impl<'a, T: SyncEntity> LibSqlRecordRepository<'a, T> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            _kind: PhantomData,
        }
    }

    const fn records_table() -> &'static str {
        records_table(T::KIND)
    }

    const fn tombstones_table() -> &'static str {
        tombstones_table(T::KIND)
    }

    /// Parse an entity from its JSON payload column
    fn parse_payload(payload: &str) -> Result<T> {
        Ok(serde_json::from_str(payload)?)
    }

    async fn collect_payloads(&self, mut rows: libsql::Rows) -> Result<Vec<T>> {
        let mut entities = Vec::new();
        while let Some(row) = rows.next().await? {
            let payload: String = row.get(0)?;
            entities.push(Self::parse_payload(&payload)?);
        }
        Ok(entities)
    }

    async fn write_entity(&self, entity: &T) -> Result<()> {
        let payload = serde_json::to_string(entity)?;
        let sql = format!(
            "INSERT INTO {} (id, payload, created_at, last_modified_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                payload = excluded.payload,
                created_at = excluded.created_at,
                last_modified_at = excluded.last_modified_at",
            Self::records_table()
        );
        self.conn
            .execute(
                &sql,
                libsql::params![
                    entity.id(),
                    payload,
                    entity.created_at(),
                    entity.modified_at()
                ],
            )
            .await?;
        Ok(())
    }

    /// Record a tombstone, keeping the later deletion when one already exists
    async fn write_tombstone(&self, tombstone: &DeletedRecord) -> Result<()> {
        let table = Self::tombstones_table();
        let sql = format!(
            "INSERT INTO {table} (id, deleted_at, device_id) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                deleted_at = excluded.deleted_at,
                device_id = excluded.device_id
             WHERE excluded.deleted_at > {table}.deleted_at"
        );
        self.conn
            .execute(
                &sql,
                libsql::params![
                    tombstone.id.as_str(),
                    tombstone.deleted_at,
                    tombstone.device_id.as_str()
                ],
            )
            .await?;
        Ok(())
    }

    async fn delete_in_transaction(
        &self,
        id: &str,
        deleted_at: i64,
        device_id: &str,
    ) -> Result<DeletedRecord> {
        let sql = format!("DELETE FROM {} WHERE id = ?", Self::records_table());
        let removed = self.conn.execute(&sql, [id]).await?;
        if removed == 0 {
            return Err(Error::NotFound(format!("{} {id}", T::KIND)));
        }

        let tombstone = DeletedRecord::new(id, deleted_at, device_id);
        self.write_tombstone(&tombstone).await?;
        Ok(tombstone)
    }

    async fn apply_in_transaction(&self, outcome: &MergeOutcome<T>) -> Result<()> {
        let sql = format!("DELETE FROM {}", Self::records_table());
        self.conn.execute(&sql, ()).await?;
        for entity in &outcome.entities {
            self.write_entity(entity).await?;
        }
        for tombstone in &outcome.tombstones {
            self.write_tombstone(tombstone).await?;
        }
        Ok(())
    }

    async fn begin(&self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        Ok(())
    }

    /// Commit on success, roll back on any failure
    async fn finish<R>(&self, result: Result<R>) -> Result<R> {
        match result {
            Ok(value) => {
                if let Err(e) = self.conn.execute("COMMIT", ()).await {
                    self.conn.execute("ROLLBACK", ()).await.ok();
                    return Err(e.into());
                }
                Ok(value)
            }
            Err(error) => {
                self.conn.execute("ROLLBACK", ()).await.ok();
                Err(error)
            }
        }
    }
}

impl<T: SyncEntity> RecordRepository<T> for LibSqlRecordRepository<'_, T> {
    async fn list(&self) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT payload FROM {} ORDER BY last_modified_at DESC, id ASC",
            Self::records_table()
        );
        let rows = self.conn.query(&sql, ()).await?;
        self.collect_payloads(rows).await
    }

    async fn get(&self, id: &str) -> Result<Option<T>> {
        let sql = format!("SELECT payload FROM {} WHERE id = ?", Self::records_table());
        let mut rows = self.conn.query(&sql, [id]).await?;
        match rows.next().await? {
            Some(row) => {
                let payload: String = row.get(0)?;
                Ok(Some(Self::parse_payload(&payload)?))
            }
            None => Ok(None),
        }
    }

    async fn list_ids_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT id FROM {} WHERE substr(id, 1, ?) = ? ORDER BY id LIMIT ?",
            Self::records_table()
        );
        let prefix_len = prefix.chars().count() as i64;
        let mut rows = self
            .conn
            .query(&sql, libsql::params![prefix_len, prefix, limit as i64])
            .await?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }

    async fn upsert(&self, entity: &T) -> Result<()> {
        self.write_entity(entity).await
    }

    async fn delete(&self, id: &str, deleted_at: i64, device_id: &str) -> Result<DeletedRecord> {
        self.begin().await?;
        let result = self.delete_in_transaction(id, deleted_at, device_id).await;
        self.finish(result).await
    }

    async fn tombstones(&self) -> Result<Vec<DeletedRecord>> {
        load_tombstones(self.conn, T::KIND).await
    }

    async fn apply_merged(&self, outcome: &MergeOutcome<T>) -> Result<()> {
        self.begin().await?;
        let result = self.apply_in_transaction(outcome).await;
        self.finish(result).await?;
        tracing::debug!(
            kind = %T::KIND,
            entities = outcome.entities.len(),
            tombstones = outcome.tombstones.len(),
            "Applied merged records locally"
        );
        Ok(())
    }
}

const fn records_table(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Chart => "charts",
        RecordKind::SetList => "set_lists",
    }
}

const fn tombstones_table(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Chart => "deleted_charts",
        RecordKind::SetList => "deleted_set_lists",
    }
}

/// Read the deletion log for one kind
pub(super) async fn load_tombstones(
    conn: &Connection,
    kind: RecordKind,
) -> Result<Vec<DeletedRecord>> {
    let sql = format!(
        "SELECT id, deleted_at, device_id FROM {} ORDER BY id",
        tombstones_table(kind)
    );
    let mut rows = conn.query(&sql, ()).await?;

    let mut tombstones = Vec::new();
    while let Some(row) = rows.next().await? {
        tombstones.push(DeletedRecord {
            id: row.get(0)?,
            deleted_at: row.get(1)?,
            device_id: row.get(2)?,
        });
    }
    Ok(tombstones)
}
