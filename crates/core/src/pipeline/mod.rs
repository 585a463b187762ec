//! Discovery pipeline.
//!
//! The [`RunOrchestrator`] sequences quota-gated catalog calls, seen-ledger
//! deduplication and filtering for each configured keyword and produces a
//! [`RunReport`].

mod runner;
mod types;

pub use runner::RunOrchestrator;
pub use types::{
    KeywordOutcome, KeywordStatus, PipelineError, ProgressCallback, ReportedItem, RunMetrics,
    RunProgress, RunReport, RunState,
};
