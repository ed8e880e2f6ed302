use std::path::Path;

use chordbook_core::db::{
    LibSqlChartRepository, LibSqlSetListRepository, LibSqlSettingsRepository, RecordRepository,
};
use chordbook_core::sync::SyncEntity;
use chordbook_core::util::{normalize_text_option, unix_millis_now};
use chordbook_core::Chart;
use serde::Serialize;

use crate::cli::ChartCommands;
use crate::commands::common::{
    capture_editor_input_with_initial, chart_label, format_relative_time, format_timestamp,
    open_database, resolve_chart_content, resolve_record, short_id,
};
use crate::commands::sync::auto_sync;
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartListItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: Option<u16>,
    pub created_at: i64,
    pub last_modified_at: i64,
    pub relative_time: String,
}

/// Field changes requested by `chart edit`
#[derive(Debug, Default)]
pub struct ChartChanges {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub key: Option<String>,
    pub tempo: Option<u16>,
    pub content: Option<String>,
}

impl ChartChanges {
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.key.is_none()
            && self.tempo.is_none()
            && self.content.is_none()
    }

    /// Apply to `chart`, returning whether anything changed
    pub fn apply(self, chart: &mut Chart) -> Result<bool, CliError> {
        let before = chart.clone();
        if let Some(title) = self.title {
            chart.title = normalize_title(&title)?;
        }
        if let Some(artist) = self.artist {
            chart.artist = normalize_text_option(Some(artist));
        }
        if let Some(key) = self.key {
            chart.key = normalize_text_option(Some(key));
        }
        if let Some(tempo) = self.tempo {
            chart.tempo = (tempo > 0).then_some(tempo);
        }
        if let Some(content) = self.content {
            chart.content = content;
        }
        Ok(*chart != before)
    }
}

pub async fn run_chart(command: ChartCommands, db_path: &Path) -> Result<(), CliError> {
    match command {
        ChartCommands::Add {
            title,
            artist,
            key,
            tempo,
            content,
        } => {
            let content = resolve_chart_content(&content)?.unwrap_or_default();
            let mut chart = Chart::new(normalize_title(&title)?, content);
            chart.artist = normalize_text_option(artist);
            chart.key = normalize_text_option(key);
            chart.tempo = tempo.filter(|tempo| *tempo > 0);
            run_add(&chart, db_path).await
        }
        ChartCommands::List { json } => run_list(json, db_path).await,
        ChartCommands::Show { id, json } => run_show(&id, json, db_path).await,
        ChartCommands::Edit {
            id,
            title,
            artist,
            key,
            tempo,
            content,
        } => {
            let changes = ChartChanges {
                title,
                artist,
                key,
                tempo,
                content: resolve_chart_content(&content)?,
            };
            run_edit(&id, changes, db_path).await
        }
        ChartCommands::Delete { id } => run_delete(&id, db_path).await,
    }
}

pub async fn run_add(chart: &Chart, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    LibSqlChartRepository::new(db.connection())
        .upsert(chart)
        .await?;
    tracing::debug!(id = %chart.id, "Created chart");

    println!("{}", chart.id);
    auto_sync(&db).await;
    Ok(())
}

pub async fn run_list(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let charts = LibSqlChartRepository::new(db.connection()).list().await?;

    if as_json {
        let items = charts.iter().map(chart_to_list_item).collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if charts.is_empty() {
        println!("No charts yet.");
    } else {
        for line in format_chart_lines(&charts, unix_millis_now()) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_show(id: &str, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let chart: Chart = resolve_record(&LibSqlChartRepository::new(db.connection()), id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
        return Ok(());
    }

    println!("{}", chart_label(&chart));
    println!(
        "id: {}  edited: {}",
        chart.id,
        format_timestamp(chart.modified_at())
    );
    if !chart.content.is_empty() {
        println!();
        println!("{}", chart.content);
    }
    Ok(())
}

pub async fn run_edit(id: &str, changes: ChartChanges, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let repo = LibSqlChartRepository::new(db.connection());
    let mut chart: Chart = resolve_record(&repo, id).await?;

    let changes = if changes.is_empty() {
        ChartChanges {
            content: Some(
                capture_editor_input_with_initial(&chart.content)?.unwrap_or_default(),
            ),
            ..ChartChanges::default()
        }
    } else {
        changes
    };

    if changes.apply(&mut chart)? {
        chart.touch();
        repo.upsert(&chart).await?;
        tracing::debug!(id = %chart.id, "Updated chart");
        println!("{}", chart.id);
        auto_sync(&db).await;
    } else {
        println!("{}", chart.id);
    }
    Ok(())
}

/// Delete a chart, record its tombstone and drop it from every set-list
pub async fn run_delete(id: &str, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let charts = LibSqlChartRepository::new(db.connection());
    let chart: Chart = resolve_record(&charts, id).await?;

    let device_id = LibSqlSettingsRepository::new(db.connection())
        .device_id()
        .await?;
    charts
        .delete(&chart.id, unix_millis_now(), &device_id)
        .await?;

    let set_lists = LibSqlSetListRepository::new(db.connection());
    for mut set_list in set_lists.list().await? {
        if set_list.remove_chart(&chart.id) {
            set_lists.upsert(&set_list).await?;
            tracing::debug!(set_list = %set_list.id, "Removed deleted chart from set-list");
        }
    }

    println!("{}", chart.id);
    auto_sync(&db).await;
    Ok(())
}

pub fn normalize_title(title: &str) -> Result<String, CliError> {
    normalize_text_option(Some(title.to_string())).ok_or(CliError::EmptyTitle)
}

pub fn chart_to_list_item(chart: &Chart) -> ChartListItem {
    ChartListItem {
        id: chart.id.clone(),
        title: chart.title.clone(),
        artist: chart.artist.clone(),
        key: chart.key.clone(),
        tempo: chart.tempo,
        created_at: chart.created_at,
        last_modified_at: chart.modified_at(),
        relative_time: format_relative_time(chart.modified_at(), unix_millis_now()),
    }
}

pub fn format_chart_lines(charts: &[Chart], now_ms: i64) -> Vec<String> {
    charts
        .iter()
        .map(|chart| {
            let label = chart_label(chart);
            let relative_time = format_relative_time(chart.modified_at(), now_ms);
            format!("{:<8}  {label:<40}  {relative_time}", short_id(&chart.id))
        })
        .collect()
}
