//! Discovery run integration tests.
//!
//! These tests drive complete runs against the mock catalog and an on-disk
//! seen ledger, reopening the database between runs the way separate process
//! invocations would.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use vidscout_core::{
    catalog::raw::VideoResource,
    report::ExportDocument,
    testing::{fixtures, MockCatalogApi, RecordedCatalogCall},
    CatalogApi, CatalogClient, DurationMode, JsonExporter, KeywordStatus, ResultExporter, RunConfig,
    RunLog, RunOrchestrator, RunReport, SeenLedger, SeenStore, SqliteRunLog, SqliteSeenStore,
};

/// Test helper owning the mock catalog and the database location.
struct TestHarness {
    api: Arc<MockCatalogApi>,
    db_path: PathBuf,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("vidscout.db");
        Self {
            api: Arc::new(MockCatalogApi::new()),
            db_path,
            temp_dir,
        }
    }

    /// Open the ledger fresh from disk.
    fn store(&self) -> Arc<dyn SeenStore> {
        Arc::new(SqliteSeenStore::new(&self.db_path).expect("Failed to open seen store"))
    }

    /// Run once with a newly built orchestrator and store.
    async fn run(&self, config: &RunConfig) -> RunReport {
        let client = CatalogClient::new(Arc::clone(&self.api) as Arc<dyn CatalogApi>);
        RunOrchestrator::new(client, self.store(), 50)
            .run(config)
            .await
            .expect("run failed")
    }

    async fn add_video(&self, video: VideoResource) {
        self.api.add_video(video).await;
    }

    async fn detail_lookups(&self) -> Vec<Vec<String>> {
        self.api
            .recorded_calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                RecordedCatalogCall::ListVideos { ids } => Some(ids),
                _ => None,
            })
            .collect()
    }
}

fn config(keywords: &[&str]) -> RunConfig {
    RunConfig {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        ..Default::default()
    }
}

fn ids(report: &RunReport) -> Vec<&str> {
    report.results.iter().map(|r| r.record.id.as_str()).collect()
}

/// A US video with 5000 views lasting 5 minutes.
fn us_video(id: &str) -> VideoResource {
    let mut video = fixtures::video(id, "UC1", 5000, "PT5M");
    if let Some(snippet) = video.snippet.as_mut() {
        snippet.region_code = Some("US".to_string());
    }
    video
}

#[tokio::test]
async fn test_reported_items_are_not_reported_again() {
    let h = TestHarness::new();
    h.api
        .add_search_page("rust", fixtures::search_page(&["abc123"], None))
        .await;
    h.add_video(fixtures::video("abc123", "UC1", 5000, "PT5M")).await;

    let first = h.run(&config(&["rust"])).await;
    assert_eq!(ids(&first), vec!["abc123"]);

    let ledger = SeenLedger::load(h.store()).unwrap();
    assert!(ledger.contains("abc123"));

    h.api.clear_recorded().await;
    let second = h.run(&config(&["rust"])).await;

    assert!(second.results.is_empty());
    assert_eq!(second.keywords[0].status, KeywordStatus::Completed);
    // Dedupe happens before enrichment, so nothing is looked up.
    assert!(h.detail_lookups().await.is_empty());
    assert_eq!(second.metrics.quota_used, 100);
}

#[tokio::test]
async fn test_fresh_search_clears_ledger_and_reports_again() {
    let h = TestHarness::new();
    h.api
        .add_search_page("rust", fixtures::search_page(&["abc123"], None))
        .await;
    h.add_video(fixtures::video("abc123", "UC1", 5000, "PT5M")).await;

    h.run(&config(&["rust"])).await;

    let mut fresh = config(&["rust"]);
    fresh.fresh_search = true;
    let second = h.run(&fresh).await;
    assert_eq!(ids(&second), vec!["abc123"]);

    // The reset ledger holds only what the fresh run recorded.
    assert_eq!(SeenLedger::load(h.store()).unwrap().len(), 1);
}

#[tokio::test]
async fn test_only_new_items_surface_in_later_run() {
    let h = TestHarness::new();
    h.api
        .add_search_page("rust", fixtures::search_page(&["a", "b"], None))
        .await;
    for id in ["a", "b", "c"] {
        h.add_video(fixtures::video(id, "UC1", 100, "PT2M")).await;
    }

    let first = h.run(&config(&["rust"])).await;
    assert_eq!(ids(&first), vec!["a", "b"]);

    h.api
        .add_search_page("rust", fixtures::search_page(&["b", "c", "a"], None))
        .await;
    h.api.clear_recorded().await;
    let second = h.run(&config(&["rust"])).await;

    assert_eq!(ids(&second), vec!["c"]);
    assert_eq!(h.detail_lookups().await, vec![vec!["c".to_string()]]);
    assert_eq!(second.keywords[0].scanned, 3);
    assert_eq!(second.keywords[0].fresh, 1);
}

#[tokio::test]
async fn test_filter_bounds_from_config() {
    let h = TestHarness::new();
    h.api
        .add_search_page("rust", fixtures::search_page(&["abc123"], None))
        .await;
    h.add_video(us_video("abc123")).await;

    let mut strict = config(&["rust"]);
    strict.views_min = Some(1000);
    strict.duration = DurationMode::Custom;
    strict.duration_max = Some(4);
    strict.region = Some("US".to_string());
    let rejected = h.run(&strict).await;
    assert!(rejected.results.is_empty());
    assert_eq!(rejected.keywords[0].fresh, 1);

    // Rejected items are not recorded, so a looser run still finds them.
    let mut loose = strict.clone();
    loose.duration_max = Some(10);
    let accepted = h.run(&loose).await;
    assert_eq!(ids(&accepted), vec!["abc123"]);
}

#[tokio::test]
async fn test_hidden_and_unknown_subscriber_owners() {
    let h = TestHarness::new();
    h.api
        .add_search_page("rust", fixtures::search_page(&["open", "hidden", "quiet"], None))
        .await;
    h.add_video(fixtures::video("open", "UC_open", 100, "PT1M")).await;
    h.add_video(fixtures::video("hidden", "UC_hidden", 100, "PT1M")).await;
    h.add_video(fixtures::video("quiet", "UC_quiet", 100, "PT1M")).await;
    h.api
        .add_channel(fixtures::channel("UC_open", Some(50), false))
        .await;
    h.api
        .add_channel(fixtures::channel("UC_hidden", Some(5_000_000), true))
        .await;
    h.api.add_channel(fixtures::channel("UC_quiet", None, false)).await;

    let mut cfg = config(&["rust"]);
    cfg.subs_min = Some(1000);
    let report = h.run(&cfg).await;

    // UC_open is below the bound, UC_hidden is skipped, UC_quiet is unknown.
    assert_eq!(ids(&report), vec!["quiet"]);
    assert_eq!(report.results[0].subscriber_count, None);
}

#[tokio::test]
async fn test_partial_failure_still_exports_and_logs() {
    let h = TestHarness::new();
    h.api.fail_search_for("broken").await;
    h.api
        .add_search_page("rust", fixtures::search_page(&["abc123"], None))
        .await;
    h.add_video(fixtures::video("abc123", "UC1", 5000, "PT5M")).await;

    let report = h.run(&config(&["broken", "rust"])).await;
    assert!(report.has_failures());
    assert_eq!(ids(&report), vec!["abc123"]);

    let exporter = JsonExporter::new(h.temp_dir.path().join("export"));
    let path = exporter.export(&report).unwrap();
    let document: ExportDocument =
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(document.keywords, "broken; rust");
    assert_eq!(document.results[0].keyword, "rust");

    let run_log = SqliteRunLog::new(&h.db_path).unwrap();
    run_log
        .log_run(&report.run_id, report.finished_at, &report.metrics)
        .unwrap();
    let runs = run_log.recent_runs(1).unwrap();
    assert_eq!(runs[0].run_id, report.run_id);
    assert_eq!(runs[0].metrics.results_count, 1);
    assert!(runs[0].metrics.error.as_deref().unwrap().starts_with("broken:"));
}

#[tokio::test]
async fn test_quota_cap_is_never_exceeded() {
    let h = TestHarness::new();
    for (keyword, id) in [("one", "v1"), ("two", "v2"), ("three", "v3")] {
        h.api
            .add_search_page(keyword, fixtures::search_page(&[id], Some("more")))
            .await;
        h.add_video(fixtures::video(id, "UC1", 1, "PT1M")).await;
    }

    let mut cfg = config(&["one", "two", "three"]);
    cfg.pages_per_keyword = 3;
    cfg.daily_quota_cap = 250;
    let report = h.run(&cfg).await;

    assert!(report.metrics.quota_used <= 250);
    assert!(report.estimated_quota > report.metrics.quota_used);
    assert_eq!(report.keywords[0].status, KeywordStatus::Completed);
    assert_eq!(report.keywords[2].status, KeywordStatus::NoResults);
    assert_eq!(ids(&report), vec!["v1"]);
}
