use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::filter::FilterCriteria;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Catalog (YouTube Data API) connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Base URL of the API (default: https://www.googleapis.com/youtube/v3).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Results requested per search page (1-50, default: 50)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_page_size() -> u32 {
    50
}

/// Duration preset selected for a run.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DurationMode {
    #[default]
    Any,
    /// Under 4 minutes.
    Short,
    /// 4 to 20 minutes.
    Medium,
    /// Over 20 minutes.
    Long,
    /// Explicit `duration_min` / `duration_max`.
    Custom,
}

impl DurationMode {
    /// Inclusive whole-minute bounds for this preset.
    ///
    /// `custom_min`/`custom_max` are only consulted for `Custom`.
    pub fn minute_bounds(
        &self,
        custom_min: Option<u64>,
        custom_max: Option<u64>,
    ) -> (Option<u64>, Option<u64>) {
        match self {
            DurationMode::Any => (None, None),
            DurationMode::Short => (None, Some(3)),
            DurationMode::Medium => (Some(4), Some(20)),
            DurationMode::Long => (Some(21), None),
            DurationMode::Custom => (custom_min, custom_max),
        }
    }
}

/// Options for one orchestrated run.
///
/// Numeric bounds are signed so that negative values are rejected by
/// [`validate_run`](super::validate_run) rather than failing to parse.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub views_min: Option<i64>,
    #[serde(default)]
    pub views_max: Option<i64>,
    #[serde(default)]
    pub subs_min: Option<i64>,
    #[serde(default)]
    pub subs_max: Option<i64>,
    #[serde(default)]
    pub duration: DurationMode,
    /// Minimum minutes, only used with `duration = "custom"`.
    #[serde(default)]
    pub duration_min: Option<i64>,
    /// Maximum minutes, only used with `duration = "custom"`.
    #[serde(default)]
    pub duration_max: Option<i64>,
    /// ISO 3166-1 alpha-2 region code. Empty means no constraint.
    #[serde(default)]
    pub region: Option<String>,
    /// ISO 639-1 language code. Empty means no constraint.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_pages_per_keyword")]
    pub pages_per_keyword: i64,
    #[serde(default = "default_quota_cap")]
    pub daily_quota_cap: i64,
    #[serde(default = "default_true")]
    pub skip_hidden_subscribers: bool,
    /// Clear the seen ledger before loading it.
    #[serde(default)]
    pub fresh_search: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            views_min: None,
            views_max: None,
            subs_min: None,
            subs_max: None,
            duration: DurationMode::Any,
            duration_min: None,
            duration_max: None,
            region: None,
            language: None,
            pages_per_keyword: default_pages_per_keyword(),
            daily_quota_cap: default_quota_cap(),
            skip_hidden_subscribers: true,
            fresh_search: false,
        }
    }
}

fn default_pages_per_keyword() -> i64 {
    1
}

fn default_quota_cap() -> i64 {
    9500
}

fn default_true() -> bool {
    true
}

/// A [`RunConfig`] that passed validation, with typed bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Trimmed, non-empty keywords in configured order.
    pub keywords: Vec<String>,
    pub criteria: FilterCriteria,
    pub pages_per_keyword: u32,
    pub daily_quota_cap: u64,
    pub fresh_search: bool,
}

impl RunPlan {
    pub fn region(&self) -> Option<&str> {
        self.criteria.region.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.criteria.language.as_deref()
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("vidscout.db")
}

/// Result export configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("export")
}

/// Metrics dump configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Where to write the Prometheus text exposition after a run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub catalog: SanitizedCatalogConfig,
    pub run: RunConfig,
    pub database: DatabaseConfig,
    pub export: ExportConfig,
    pub metrics: MetricsConfig,
}

/// Sanitized catalog config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
    pub page_size: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            catalog: SanitizedCatalogConfig {
                base_url: config.catalog.base_url.clone(),
                api_key_configured: !config.catalog.api_key.is_empty(),
                timeout_secs: config.catalog.timeout_secs,
                page_size: config.catalog.page_size,
            },
            run: config.run.clone(),
            database: config.database.clone(),
            export: config.export.clone(),
            metrics: config.metrics.clone(),
        }
    }
}
