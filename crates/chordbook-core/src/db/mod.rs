//! Local libSQL storage for Chordbook

mod connection;
mod deletion_log;
mod migrations;
mod record_repository;
mod settings_repository;

pub use connection::Database;
pub use deletion_log::LibSqlDeletionLog;
pub use record_repository::{
    LibSqlChartRepository, LibSqlRecordRepository, LibSqlSetListRepository, RecordRepository,
};
pub use settings_repository::LibSqlSettingsRepository;
