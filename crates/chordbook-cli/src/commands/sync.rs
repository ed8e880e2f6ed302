use std::io::{self, IsTerminal, Write};
use std::path::Path;

use chordbook_core::db::{
    Database, LibSqlChartRepository, LibSqlDeletionLog, LibSqlSetListRepository,
    LibSqlSettingsRepository, RecordRepository,
};
use chordbook_core::remote::FolderRemote;
use chordbook_core::sync::{
    ConflictDecision, ConflictResolver, ConflictSet, SyncLock, SyncManager, SyncResult,
    SyncStateStore,
};
use serde::Serialize;

use crate::cli::SyncCommands;
use crate::commands::common::{format_timestamp, open_database, resolve_remote_folder, short_id};
use crate::error::CliError;

type FolderSyncManager<'a> =
    SyncManager<FolderRemote, LibSqlDeletionLog<'a>, LibSqlSettingsRepository<'a>>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub last_sync_time: Option<i64>,
    pub last_sync_time_iso: Option<String>,
    pub auto_sync: bool,
    pub show_conflict_warning: bool,
    pub remote_folder: Option<String>,
    pub device_id: String,
}

/// Asks on the terminal before overwriting conflicting changes
pub struct PromptResolver {
    pub assume_yes: bool,
}

impl ConflictResolver for PromptResolver {
    async fn decide(&self, conflicts: ConflictSet<'_>) -> ConflictDecision {
        eprintln!(
            "{} record(s) changed both here and on the remote since the last sync:",
            conflicts.len()
        );
        for line in format_conflict_lines(conflicts) {
            eprintln!("  {line}");
        }

        if self.assume_yes {
            return ConflictDecision::Overwrite;
        }
        if !io::stdin().is_terminal() {
            eprintln!("Not running on a terminal; re-run with --yes to overwrite.");
            return ConflictDecision::Cancel;
        }

        eprint!("Keep the most recent edit of each and overwrite the rest? [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return ConflictDecision::Cancel;
        }
        parse_confirmation(&answer)
    }
}

pub async fn run_sync_command(
    command: Option<SyncCommands>,
    assume_yes: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    match command {
        None => run_sync(assume_yes, db_path).await,
        Some(SyncCommands::Status { json }) => run_sync_status(json, db_path).await,
    }
}

pub async fn run_sync(assume_yes: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let result = sync_database(&db, &PromptResolver { assume_yes }).await?;

    if let Some(message) = failure_message(&result) {
        return Err(CliError::SyncFailed(message));
    }
    println!("{}", summarize(&result));
    Ok(())
}

pub async fn run_sync_status(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let settings = LibSqlSettingsRepository::new(db.connection());
    let config = settings.load_sync_config().await?;
    let last_sync_time = settings.last_sync_time().await?;

    let status = SyncStatus {
        last_sync_time,
        last_sync_time_iso: last_sync_time.map(format_timestamp),
        auto_sync: config.auto_sync,
        show_conflict_warning: config.show_conflict_warning,
        remote_folder: resolve_remote_folder(&settings)
            .await?
            .map(|folder| folder.display().to_string()),
        device_id: settings.device_id().await?,
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "last sync:             {}",
        status.last_sync_time_iso.as_deref().unwrap_or("never")
    );
    println!(
        "remote folder:         {}",
        status.remote_folder.as_deref().unwrap_or("(not connected)")
    );
    println!("auto sync:             {}", status.auto_sync);
    println!("show conflict warning: {}", status.show_conflict_warning);
    println!("device:                {}", status.device_id);
    Ok(())
}

/// Run one cycle against the configured folder and apply the merged state locally.
///
/// Holds the database's sync lock until the merged state is applied, so a
/// second invocation fails with `AlreadySyncing` instead of racing this one.
pub async fn sync_database<R: ConflictResolver>(
    db: &Database,
    resolver: &R,
) -> Result<SyncResult, CliError> {
    let _lock = db.path().map(SyncLock::acquire).transpose()?;
    let manager = folder_sync_manager(db).await?;
    let charts = LibSqlChartRepository::new(db.connection());
    let set_lists = LibSqlSetListRepository::new(db.connection());

    let result = manager
        .sync_with_resolver(&charts.list().await?, &set_lists.list().await?, resolver)
        .await?;

    if let Some(merged) = result.merged.as_ref() {
        charts.apply_merged(&merged.charts).await?;
        set_lists.apply_merged(&merged.set_lists).await?;
    }
    Ok(result)
}

/// Sync after a local edit when the user opted in; failures are only logged
pub async fn auto_sync(db: &Database) {
    match try_auto_sync(db).await {
        Ok(Some(result)) => match failure_message(&result) {
            Some(message) => tracing::warn!("Automatic sync did not complete: {message}"),
            None => tracing::info!("{}", summarize(&result)),
        },
        Ok(None) => {}
        Err(error) => tracing::warn!("Automatic sync failed: {error}"),
    }
}

async fn try_auto_sync(db: &Database) -> Result<Option<SyncResult>, CliError> {
    let settings = LibSqlSettingsRepository::new(db.connection());
    if !settings.load_sync_config().await?.auto_sync {
        return Ok(None);
    }
    if resolve_remote_folder(&settings).await?.is_none() {
        tracing::debug!("Auto sync enabled but no remote folder is connected");
        return Ok(None);
    }
    sync_database(db, &PromptResolver { assume_yes: false })
        .await
        .map(Some)
}

async fn folder_sync_manager(db: &Database) -> Result<FolderSyncManager<'_>, CliError> {
    let settings = LibSqlSettingsRepository::new(db.connection());
    let folder = resolve_remote_folder(&settings)
        .await?
        .ok_or(CliError::RemoteNotConfigured)?;
    let device_id = settings.device_id().await?;

    Ok(SyncManager::new(
        FolderRemote::connected(folder),
        LibSqlDeletionLog::new(db.connection()),
        settings,
        device_id,
    ))
}

/// Why a cycle did not succeed, or `None` when it did.
///
/// A cancelled cycle is not a failure: nothing was pushed and the user chose so.
pub fn failure_message(result: &SyncResult) -> Option<String> {
    if result.success || result.errors.is_empty() {
        return None;
    }
    Some(
        result
            .errors
            .iter()
            .map(|error| format!("[{}] {}", error.kind, error.message))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

pub fn summarize(result: &SyncResult) -> String {
    if !result.success {
        return "Sync cancelled; nothing was pushed.".to_string();
    }

    let mut summary = format!(
        "Synced {} chart(s) and {} set-list(s)",
        result.synced_chart_ids.len(),
        result.synced_set_list_ids.len()
    );
    if result.has_conflicts() {
        summary.push_str(&format!(
            "; {} conflict(s) settled by most recent edit",
            result.conflict_count()
        ));
    }
    summary
}

pub fn format_conflict_lines(conflicts: ConflictSet<'_>) -> Vec<String> {
    let charts = conflicts.charts.iter().map(|conflict| {
        format!(
            "chart    {:<8}  {:<32}  local {}  remote {}",
            short_id(conflict.id()),
            conflict.local_entity.title,
            format_timestamp(conflict.local_metadata.last_modified_at),
            format_timestamp(conflict.remote_metadata.last_modified_at)
        )
    });
    let set_lists = conflicts.set_lists.iter().map(|conflict| {
        format!(
            "set-list {:<8}  {:<32}  local {}  remote {}",
            short_id(conflict.id()),
            conflict.local_entity.name,
            format_timestamp(conflict.local_metadata.last_modified_at),
            format_timestamp(conflict.remote_metadata.last_modified_at)
        )
    });
    charts.chain(set_lists).collect()
}

pub fn parse_confirmation(answer: &str) -> ConflictDecision {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => ConflictDecision::Overwrite,
        _ => ConflictDecision::Cancel,
    }
}
