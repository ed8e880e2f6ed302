//! Local deletion log contract

use crate::error::Result;
use crate::models::{DeletedChart, DeletedSetList};

/// Read access to the tombstones the application records on local deletes.
///
/// The engine never writes tombstones itself.
#[allow(async_fn_in_trait)]
pub trait DeletionLog {
    async fn load_deleted_charts(&self) -> Result<Vec<DeletedChart>>;

    async fn load_deleted_set_lists(&self) -> Result<Vec<DeletedSetList>>;
}
