mod metrics;

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidscout_core::pipeline::ProgressCallback;
use vidscout_core::{
    load_config, validate_config, CatalogApi, CatalogClient, Config, JsonExporter, PipelineError,
    ResultExporter, RunLog, RunProgress, RunReport, SanitizedConfig, SeenStore, SqliteRunLog,
    SqliteSeenStore, YouTubeApi,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("VIDSCOUT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("vidscout {} loading configuration from {:?}", VERSION, config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    // Hash the sanitized config so runs can be correlated with the settings used
    let sanitized = SanitizedConfig::from(&config);
    let config_json = serde_json::to_string(&sanitized).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        config_hash = &config_hash[..16],
        keywords = config.run.keywords.len(),
        "Configuration loaded successfully"
    );
    info!("Database path: {:?}", config.database.path);

    // Create catalog transport
    let api: Arc<dyn CatalogApi> =
        Arc::new(YouTubeApi::new(&config.catalog).context("Failed to create catalog client")?);
    let client = CatalogClient::new(api);

    // Create SQLite stores
    let seen_store: Arc<dyn SeenStore> = Arc::new(
        SqliteSeenStore::new(&config.database.path).context("Failed to open seen ledger")?,
    );
    let run_log = SqliteRunLog::new(&config.database.path).context("Failed to open run log")?;
    let exporter = JsonExporter::new(&config.export.dir);

    let progress: ProgressCallback = Arc::new(|p: &RunProgress| {
        debug!(
            state = p.state.as_str(),
            keyword = p.keyword_index + 1,
            of = p.keyword_total,
            scanned = p.scanned,
            kept = p.kept,
            skipped = p.skipped,
            "Progress"
        );
    });
    let orchestrator = vidscout_core::RunOrchestrator::new(
        client,
        Arc::clone(&seen_store),
        config.catalog.page_size,
    )
    .with_progress(progress);

    // Stop between keywords on Ctrl+C
    let cancel = orchestrator.cancel_flag();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing current step");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let outcome = orchestrator.run(&config.run).await;

    let result = match outcome {
        Ok(report) => {
            deliver(&report, &exporter, &run_log, None);
            if report.has_failures() {
                warn!(
                    "Run finished with failures: {}",
                    report.metrics.error.as_deref().unwrap_or_default()
                );
            }
            Ok(())
        }
        Err(PipelineError::SeenLedger { source, report }) => {
            // Results already recorded must still reach the export.
            deliver(&report, &exporter, &run_log, Some(source.to_string()));
            Err(anyhow::Error::new(source).context("Seen ledger write failed, run aborted"))
        }
        Err(e @ PipelineError::Validation(_)) => Err(e.into()),
    };

    write_metrics(&config);
    result
}

/// Hand a finished run to the exporter and the run log.
///
/// Sink failures are logged and do not change the outcome of the run.
fn deliver(
    report: &RunReport,
    exporter: &dyn ResultExporter,
    run_log: &dyn RunLog,
    fatal: Option<String>,
) {
    if report.results.is_empty() {
        info!("No new results to export");
    } else {
        match exporter.export(report) {
            Ok(path) => info!("Saved {} results to {:?}", report.results.len(), path),
            Err(e) => error!("Failed to export results: {}", e),
        }
    }

    let mut metrics = report.metrics.clone();
    if metrics.error.is_none() {
        metrics.error = fatal;
    }
    if let Err(e) = run_log.log_run(&report.run_id, report.finished_at, &metrics) {
        error!("Failed to log run: {}", e);
    }

    info!(
        run_id = %report.run_id,
        keywords = %report.keyword_list(),
        results = metrics.results_count,
        quota_used = metrics.quota_used,
        estimated_quota = report.estimated_quota,
        "Run summary"
    );
}

fn write_metrics(config: &Config) {
    if let Some(path) = &config.metrics.path {
        match metrics::write_to(path) {
            Ok(()) => info!("Metrics written to {:?}", path),
            Err(e) => warn!("Failed to write metrics: {:#}", e),
        }
    }
}
