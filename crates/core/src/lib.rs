pub mod catalog;
pub mod config;
pub mod filter;
pub mod metrics;
pub mod pipeline;
pub mod quota;
pub mod report;
pub mod seen;
pub mod testing;

pub use catalog::{CatalogApi, CatalogClient, CatalogError, ItemRecord, OwnerInfo, YouTubeApi};
pub use config::{
    load_config, load_config_from_str, validate_config, validate_run, Config, ConfigError,
    DurationMode, RunConfig, RunPlan, SanitizedConfig,
};
pub use filter::{FilterCriteria, Rejection};
pub use pipeline::{
    KeywordOutcome, KeywordStatus, PipelineError, ReportedItem, RunMetrics, RunOrchestrator,
    RunProgress, RunReport, RunState,
};
pub use quota::{QuotaLedger, QuotaState};
pub use report::{JsonExporter, ReportError, ResultExporter, RunLog, SqliteRunLog};
pub use seen::{SeenError, SeenLedger, SeenStore, SqliteSeenStore};
