//! Daily JSON export of reported items.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ReportError, ResultExporter};
use crate::pipeline::{ReportedItem, RunReport};

/// One exported item, flattened for spreadsheet-style consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub title: String,
    pub description: String,
    /// Tags joined with commas.
    pub tags: String,
    pub video_url: String,
    pub video_id: String,
    pub channel_title: String,
    pub channel_id: String,
    pub subscriber_count: Option<u64>,
    pub view_count: u64,
    pub duration_minutes: u64,
    pub published_at: NaiveDate,
    pub keyword: String,
}

impl From<&ReportedItem> for ExportRow {
    fn from(item: &ReportedItem) -> Self {
        let r = &item.record;
        Self {
            title: r.title.clone(),
            description: r.description.clone(),
            tags: r.tags.join(","),
            video_url: item.url.clone(),
            video_id: r.id.clone(),
            channel_title: r.owner_title.clone(),
            channel_id: r.owner_id.clone(),
            subscriber_count: item.subscriber_count,
            view_count: r.view_count,
            duration_minutes: r.duration_minutes(),
            published_at: r.published_at,
            keyword: item.keyword.clone(),
        }
    }
}

/// Contents of an export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub run_id: String,
    pub date: NaiveDate,
    /// All keywords of the run, joined with "; ".
    pub keywords: String,
    pub results: Vec<ExportRow>,
}

/// Writes `<dir>/results_<YYYY-MM-DD>.json`.
///
/// A later run on the same day replaces the file.
pub struct JsonExporter {
    dir: PathBuf,
}

impl JsonExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the export file for `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("results_{}.json", date.format("%Y-%m-%d")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ResultExporter for JsonExporter {
    fn export(&self, report: &RunReport) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.dir)?;

        let date = report.finished_at.date_naive();
        let document = ExportDocument {
            run_id: report.run_id.clone(),
            date,
            keywords: report
                .keywords
                .iter()
                .map(|k| k.keyword.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            results: report.results.iter().map(ExportRow::from).collect(),
        };

        let path = self.path_for(date);
        fs::write(&path, serde_json::to_vec_pretty(&document)?)?;
        info!(path = %path.display(), count = document.results.len(), "Exported results");
        Ok(path)
    }
}
