//! Types for the discovery pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::ItemRecord;
use crate::seen::SeenError;

/// Errors that end a run.
///
/// Catalog failures are not here: they are confined to the keyword that
/// raised them and surface in [`KeywordStatus::Failed`] and
/// [`RunMetrics::error`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The run configuration was rejected. Nothing was fetched.
    #[error("invalid run configuration: {0}")]
    Validation(String),

    /// The seen ledger could not be reset, loaded or written.
    ///
    /// `report` holds everything recorded before the failure.
    #[error("seen ledger failure: {source}")]
    SeenLedger {
        source: SeenError,
        report: Box<RunReport>,
    },
}

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Estimating,
    Searching,
    Deduplicating,
    Enriching,
    Filtering,
    Recording,
    Finalizing,
    Done,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Estimating => "estimating",
            RunState::Searching => "searching",
            RunState::Deduplicating => "deduplicating",
            RunState::Enriching => "enriching",
            RunState::Filtering => "filtering",
            RunState::Recording => "recording",
            RunState::Finalizing => "finalizing",
            RunState::Done => "done",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How processing of one keyword ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordStatus {
    /// All requested pages were processed.
    Completed,
    /// The first search page came back empty (includes quota short-circuits).
    NoResults,
    /// A catalog call failed; the message is the error text.
    Failed(String),
    /// Not processed, or interrupted, because the run was cancelled.
    Skipped,
}

impl KeywordStatus {
    /// Label used for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordStatus::Completed => "completed",
            KeywordStatus::NoResults => "no_results",
            KeywordStatus::Failed(_) => "failed",
            KeywordStatus::Skipped => "skipped",
        }
    }
}

/// Per-keyword summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordOutcome {
    pub keyword: String,
    pub status: KeywordStatus,
    /// Search hits returned across all pages.
    pub scanned: usize,
    /// Hits left after dropping already-reported ids.
    pub fresh: usize,
    /// Items that passed the filter and were recorded.
    pub kept: usize,
}

impl KeywordOutcome {
    pub(crate) fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            status: KeywordStatus::Completed,
            scanned: 0,
            fresh: 0,
            kept: 0,
        }
    }
}

/// One item surfaced by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedItem {
    #[serde(flatten)]
    pub record: ItemRecord,
    /// Owner subscriber count, when disclosed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_count: Option<u64>,
    /// Keyword whose search surfaced the item.
    pub keyword: String,
    pub url: String,
}

/// Summary handed to the run log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub keywords_count: usize,
    pub results_count: usize,
    pub quota_used: u64,
    /// First per-keyword error, if any keyword failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Advisory planning estimate, not a bound on `metrics.quota_used`.
    pub estimated_quota: u64,
    pub keywords: Vec<KeywordOutcome>,
    pub results: Vec<ReportedItem>,
    pub metrics: RunMetrics,
}

impl RunReport {
    /// True if any keyword failed.
    pub fn has_failures(&self) -> bool {
        self.metrics.error.is_some()
    }

    /// Configured keywords joined for display.
    pub fn keyword_list(&self) -> String {
        self.keywords
            .iter()
            .map(|k| k.keyword.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Snapshot passed to the progress callback on every state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProgress {
    pub state: RunState,
    /// Zero-based index of the keyword being processed.
    pub keyword_index: usize,
    pub keyword_total: usize,
    /// Search hits seen so far in this run.
    pub scanned: usize,
    /// Items reported so far in this run.
    pub kept: usize,
    /// Hits skipped as already reported so far in this run.
    pub skipped: usize,
}

/// Progress callback.
pub type ProgressCallback = Arc<dyn Fn(&RunProgress) + Send + Sync>;
