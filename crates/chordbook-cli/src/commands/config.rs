use std::path::Path;

use chordbook_core::db::LibSqlSettingsRepository;
use chordbook_core::models::SyncConfig;
use chordbook_core::sync::SyncStateStore;

use crate::cli::ConfigCommands;
use crate::commands::common::open_database;
use crate::error::CliError;

pub async fn run_config(command: ConfigCommands, db_path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => run_config_show(db_path).await,
        ConfigCommands::Set {
            auto_sync,
            show_conflict_warning,
        } => run_config_set(auto_sync, show_conflict_warning, db_path).await,
    }
}

pub async fn run_config_show(db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let config = LibSqlSettingsRepository::new(db.connection())
        .load_sync_config()
        .await?;
    for line in format_config_lines(&config) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_config_set(
    auto_sync: Option<bool>,
    show_conflict_warning: Option<bool>,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let settings = LibSqlSettingsRepository::new(db.connection());

    let current = settings.load_sync_config().await?;
    let updated = apply_config_changes(current, auto_sync, show_conflict_warning);
    if updated != current {
        settings.save_sync_config(&updated).await?;
        tracing::info!(
            auto_sync = updated.auto_sync,
            show_conflict_warning = updated.show_conflict_warning,
            "Saved sync preferences"
        );
    }

    for line in format_config_lines(&updated) {
        println!("{line}");
    }
    Ok(())
}

pub const fn apply_config_changes(
    mut config: SyncConfig,
    auto_sync: Option<bool>,
    show_conflict_warning: Option<bool>,
) -> SyncConfig {
    if let Some(auto_sync) = auto_sync {
        config.auto_sync = auto_sync;
    }
    if let Some(show_conflict_warning) = show_conflict_warning {
        config.show_conflict_warning = show_conflict_warning;
    }
    config
}

pub fn format_config_lines(config: &SyncConfig) -> Vec<String> {
    vec![
        format!("auto_sync = {}", config.auto_sync),
        format!("show_conflict_warning = {}", config.show_conflict_warning),
    ]
}
