use std::path::Path;

use chordbook_core::db::LibSqlSettingsRepository;
use chordbook_core::remote::FolderRemote;
use chordbook_core::sync::RemoteAdapter;

use crate::cli::RemoteCommands;
use crate::commands::common::{open_database, resolve_remote_folder};
use crate::error::CliError;

pub async fn run_remote(command: RemoteCommands, db_path: &Path) -> Result<(), CliError> {
    match command {
        RemoteCommands::Connect { path } => run_connect(&path, db_path).await,
        RemoteCommands::Disconnect => run_disconnect(db_path).await,
        RemoteCommands::Status => run_status(db_path).await,
    }
}

pub async fn run_connect(folder: &Path, db_path: &Path) -> Result<(), CliError> {
    let remote = FolderRemote::new(folder);
    remote.authenticate().await?;
    let folder = std::fs::canonicalize(folder)?;

    let db = open_database(db_path).await?;
    LibSqlSettingsRepository::new(db.connection())
        .set_remote_folder(Some(&folder.to_string_lossy()))
        .await?;

    println!("{}", folder.display());
    Ok(())
}

pub async fn run_disconnect(db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let settings = LibSqlSettingsRepository::new(db.connection());
    let Some(folder) = settings.remote_folder().await? else {
        println!("No remote folder connected.");
        return Ok(());
    };

    FolderRemote::connected(&folder).sign_out().await?;
    settings.set_remote_folder(None).await?;
    println!("Disconnected {folder}");
    Ok(())
}

pub async fn run_status(db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let settings = LibSqlSettingsRepository::new(db.connection());
    let Some(folder) = resolve_remote_folder(&settings).await? else {
        return Err(CliError::RemoteNotConfigured);
    };

    let remote = FolderRemote::connected(&folder);
    println!("folder:        {}", folder.display());
    if !remote.is_authenticated() {
        println!("status:        unavailable (folder is missing)");
        return Ok(());
    }

    let info = remote.storage_info().await?;
    let metadata = remote.remote_metadata().await?;
    println!("status:        connected");
    println!("used:          {}", format_bytes(info.used));
    if let Some(total) = info.total {
        println!("total:         {}", format_bytes(total));
    }
    println!("charts:        {}", metadata.charts.len());
    println!("set-lists:     {}", metadata.set_lists.len());
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;

    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    }
}
