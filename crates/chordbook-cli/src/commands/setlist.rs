use std::path::Path;

use chordbook_core::db::{
    LibSqlChartRepository, LibSqlSetListRepository, LibSqlSettingsRepository, RecordRepository,
};
use chordbook_core::sync::SyncEntity;
use chordbook_core::util::{normalize_text_option, unix_millis_now};
use chordbook_core::{Chart, SetList};
use serde::Serialize;

use crate::cli::SetListCommands;
use crate::commands::common::{
    chart_label, format_relative_time, open_database, resolve_record, short_id,
};
use crate::commands::sync::auto_sync;
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetListItem {
    pub id: String,
    pub name: String,
    pub chart_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub last_modified_at: i64,
}

pub async fn run_set_list(command: SetListCommands, db_path: &Path) -> Result<(), CliError> {
    match command {
        SetListCommands::Add {
            name,
            charts,
            notes,
        } => run_add(&name, &charts, notes, db_path).await,
        SetListCommands::List { json } => run_list(json, db_path).await,
        SetListCommands::Show { id } => run_show(&id, db_path).await,
        SetListCommands::Delete { id } => run_delete(&id, db_path).await,
    }
}

pub async fn run_add(
    name: &str,
    chart_queries: &[String],
    notes: Option<String>,
    db_path: &Path,
) -> Result<(), CliError> {
    let name = normalize_text_option(Some(name.to_string())).ok_or(CliError::EmptyName)?;

    let db = open_database(db_path).await?;
    let charts = LibSqlChartRepository::new(db.connection());
    let mut chart_ids = Vec::with_capacity(chart_queries.len());
    for query in chart_queries {
        let chart: Chart = resolve_record(&charts, query).await?;
        chart_ids.push(chart.id);
    }

    let mut set_list = SetList::new(name).with_charts(chart_ids);
    set_list.notes = normalize_text_option(notes);
    LibSqlSetListRepository::new(db.connection())
        .upsert(&set_list)
        .await?;

    println!("{}", set_list.id);
    auto_sync(&db).await;
    Ok(())
}

pub async fn run_list(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let set_lists = LibSqlSetListRepository::new(db.connection()).list().await?;

    if as_json {
        let items = set_lists.iter().map(set_list_to_item).collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if set_lists.is_empty() {
        println!("No set-lists yet.");
    } else {
        for line in format_set_list_lines(&set_lists, unix_millis_now()) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_show(id: &str, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let set_list: SetList =
        resolve_record(&LibSqlSetListRepository::new(db.connection()), id).await?;
    let charts = LibSqlChartRepository::new(db.connection());

    println!("{}  ({})", set_list.name, short_id(&set_list.id));
    if let Some(notes) = set_list.notes.as_deref() {
        println!("{notes}");
    }
    for (position, chart_id) in set_list.chart_ids.iter().enumerate() {
        let label = charts
            .get(chart_id)
            .await?
            .map_or_else(|| "(missing chart)".to_string(), |chart| chart_label(&chart));
        println!("{:>3}. {:<8}  {label}", position + 1, short_id(chart_id));
    }
    Ok(())
}

pub async fn run_delete(id: &str, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let repo = LibSqlSetListRepository::new(db.connection());
    let set_list: SetList = resolve_record(&repo, id).await?;

    let device_id = LibSqlSettingsRepository::new(db.connection())
        .device_id()
        .await?;
    repo.delete(&set_list.id, unix_millis_now(), &device_id)
        .await?;

    println!("{}", set_list.id);
    auto_sync(&db).await;
    Ok(())
}

pub fn set_list_to_item(set_list: &SetList) -> SetListItem {
    SetListItem {
        id: set_list.id.clone(),
        name: set_list.name.clone(),
        chart_ids: set_list.chart_ids.clone(),
        notes: set_list.notes.clone(),
        last_modified_at: set_list.modified_at(),
    }
}

pub fn format_set_list_lines(set_lists: &[SetList], now_ms: i64) -> Vec<String> {
    set_lists
        .iter()
        .map(|set_list| {
            let count = set_list.chart_ids.len();
            let songs = if count == 1 { "song" } else { "songs" };
            format!(
                "{:<8}  {:<32}  {count:>3} {songs:<5}  {}",
                short_id(&set_list.id),
                set_list.name,
                format_relative_time(set_list.modified_at(), now_ms)
            )
        })
        .collect()
}
