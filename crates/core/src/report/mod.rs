//! Report sinks: result export and the run log.
//!
//! Both consume the output of a finished run and own their storage format.
//! Neither feeds back into the pipeline.

mod json;
mod sqlite;

pub use json::{ExportDocument, ExportRow, JsonExporter};
pub use sqlite::SqliteRunLog;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::{RunMetrics, RunReport};

/// Errors for report sinks.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),
}

/// Writes the results of a run somewhere a person can read them.
pub trait ResultExporter: Send + Sync {
    /// Export `report.results`, returning where they were written.
    fn export(&self, report: &RunReport) -> Result<PathBuf, ReportError>;
}

/// One logged run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub metrics: RunMetrics,
}

/// Append-only log of run metrics.
pub trait RunLog: Send + Sync {
    /// Append one row for a finished run.
    fn log_run(
        &self,
        run_id: &str,
        timestamp: DateTime<Utc>,
        metrics: &RunMetrics,
    ) -> Result<(), ReportError>;

    /// Most recent runs first.
    fn recent_runs(&self, limit: usize) -> Result<Vec<RunLogEntry>, ReportError>;
}
