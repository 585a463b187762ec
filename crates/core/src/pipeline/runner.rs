//! Run orchestrator implementation.
//!
//! Drives one run through its states:
//! - Idle: validate the run configuration
//! - Estimating: log the advisory quota estimate
//! - Per keyword and page: search, dedupe, enrich, filter, record
//! - Finalizing: assemble the report and metrics
//!
//! Keywords are processed strictly in order. The quota ledger and the seen
//! ledger are owned by the run and never shared across tasks.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{
    CatalogClient, CatalogError, ItemRecord, OwnerInfo, SearchOptions, MAX_BATCH_SIZE,
};
use crate::config::{validate_run, ConfigError, RunConfig, RunPlan};
use crate::filter;
use crate::metrics;
use crate::quota::{estimate, QuotaLedger};
use crate::seen::{SeenError, SeenLedger, SeenStore};

use super::types::{
    KeywordOutcome, KeywordStatus, PipelineError, ProgressCallback, ReportedItem, RunMetrics,
    RunProgress, RunReport, RunState,
};

/// Failure inside one keyword.
#[derive(Debug, Error)]
enum StepError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Ledger(#[from] SeenError),
}

/// Mutable state owned by a single run.
struct RunContext {
    quota: QuotaLedger,
    ledger: SeenLedger,
    results: Vec<ReportedItem>,
    keyword_total: usize,
    scanned: usize,
    kept: usize,
    skipped: usize,
}

/// Runs keyword searches through the discovery pipeline.
pub struct RunOrchestrator {
    client: CatalogClient,
    store: Arc<dyn SeenStore>,
    page_size: u32,
    progress: Option<ProgressCallback>,
    cancelled: Arc<AtomicBool>,
}

impl RunOrchestrator {
    /// Create a new orchestrator.
    ///
    /// `page_size` is the number of hits requested per search page.
    pub fn new(client: CatalogClient, store: Arc<dyn SeenStore>, page_size: u32) -> Self {
        Self {
            client,
            store,
            page_size,
            progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Invoke `callback` on every state change.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Flag that stops the run between keywords and between steps.
    ///
    /// An in-flight catalog call is never interrupted.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Execute one run.
    ///
    /// Catalog failures only end the keyword that raised them. The run fails
    /// outright on invalid configuration, or when the seen ledger cannot be
    /// written, in which case the error carries the partial report.
    pub async fn run(&self, config: &RunConfig) -> Result<RunReport, PipelineError> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let timer = Instant::now();

        self.emit(RunState::Idle, 0, config.keywords.len(), 0, 0, 0);
        let plan = validate_run(config).map_err(|e| match e {
            ConfigError::ValidationError(msg) => PipelineError::Validation(msg),
            other => PipelineError::Validation(other.to_string()),
        })?;
        let keyword_total = plan.keywords.len();

        self.emit(RunState::Estimating, 0, keyword_total, 0, 0, 0);
        let estimated_quota = estimate(keyword_total as u64, plan.pages_per_keyword as u64);
        info!(
            run_id = %run_id,
            keywords = keyword_total,
            pages_per_keyword = plan.pages_per_keyword,
            estimated_quota,
            cap = plan.daily_quota_cap,
            fresh_search = plan.fresh_search,
            "Starting run"
        );

        let unstarted = |source: SeenError| PipelineError::SeenLedger {
            source,
            report: Box::new(RunReport {
                run_id: run_id.clone(),
                started_at,
                finished_at: Utc::now(),
                estimated_quota,
                keywords: Vec::new(),
                results: Vec::new(),
                metrics: RunMetrics {
                    keywords_count: keyword_total,
                    ..Default::default()
                },
            }),
        };

        if plan.fresh_search {
            SeenLedger::reset(self.store.as_ref()).map_err(&unstarted)?;
        }
        let ledger = SeenLedger::load(Arc::clone(&self.store)).map_err(&unstarted)?;
        debug!(seen = ledger.len(), "Seen ledger ready");

        let mut ctx = RunContext {
            quota: QuotaLedger::new(plan.daily_quota_cap),
            ledger,
            results: Vec::new(),
            keyword_total,
            scanned: 0,
            kept: 0,
            skipped: 0,
        };
        let mut outcomes: Vec<KeywordOutcome> = Vec::with_capacity(keyword_total);
        let mut first_error: Option<String> = None;
        let mut ledger_error: Option<SeenError> = None;

        for (index, keyword) in plan.keywords.iter().enumerate() {
            let mut outcome = KeywordOutcome::new(keyword);

            if self.is_cancelled() {
                outcome.status = KeywordStatus::Skipped;
                outcomes.push(outcome);
                continue;
            }

            let result = self
                .process_keyword(&plan, index, &mut ctx, &mut outcome)
                .await;
            match result {
                Ok(status) => outcome.status = status,
                Err(StepError::Catalog(e)) => {
                    warn!(keyword = %keyword, error = %e, "Keyword failed, continuing with next keyword");
                    first_error.get_or_insert_with(|| format!("{}: {}", keyword, e));
                    outcome.status = KeywordStatus::Failed(e.to_string());
                }
                Err(StepError::Ledger(e)) => {
                    warn!(keyword = %keyword, error = %e, "Seen ledger write failed, aborting run");
                    outcome.status = KeywordStatus::Failed(e.to_string());
                    outcomes.push(outcome);
                    ledger_error = Some(e);
                    break;
                }
            }
            outcomes.push(outcome);
        }

        if ledger_error.is_some() {
            for keyword in plan.keywords.iter().skip(outcomes.len()) {
                let mut outcome = KeywordOutcome::new(keyword);
                outcome.status = KeywordStatus::Skipped;
                outcomes.push(outcome);
            }
        }

        let report = self.finalize(
            run_id,
            started_at,
            estimated_quota,
            outcomes,
            first_error,
            ctx,
        );
        metrics::RUN_DURATION.observe(timer.elapsed().as_secs_f64());

        match ledger_error {
            Some(source) => Err(PipelineError::SeenLedger {
                source,
                report: Box::new(report),
            }),
            None => Ok(report),
        }
    }

    /// Process up to `pages_per_keyword` pages for one keyword.
    async fn process_keyword(
        &self,
        plan: &RunPlan,
        index: usize,
        ctx: &mut RunContext,
        outcome: &mut KeywordOutcome,
    ) -> Result<KeywordStatus, StepError> {
        let keyword = plan.keywords[index].as_str();
        let mut page_token: Option<String> = None;

        for page_number in 0..plan.pages_per_keyword {
            // Search
            self.step(RunState::Searching, index, ctx);
            let options = SearchOptions {
                region: plan.region().map(String::from),
                language: plan.language().map(String::from),
                page_size: self.page_size,
                page_token: page_token.take(),
            };
            let page = self
                .client
                .search(&mut ctx.quota, keyword, &options)
                .await?;

            if page.is_empty() {
                if page_number == 0 {
                    info!(keyword, "No search results");
                    return Ok(KeywordStatus::NoResults);
                }
                break;
            }
            outcome.scanned += page.item_ids.len();
            ctx.scanned += page.item_ids.len();

            // Dedupe
            if self.is_cancelled() {
                return Ok(KeywordStatus::Skipped);
            }
            self.step(RunState::Deduplicating, index, ctx);
            let fresh = dedupe(&page.item_ids, &ctx.ledger);
            let skipped = page.item_ids.len() - fresh.len();
            outcome.fresh += fresh.len();
            ctx.skipped += skipped;
            metrics::ITEMS_DEDUPLICATED.inc_by(skipped as u64);
            debug!(keyword, page = page_number, fresh = fresh.len(), skipped, "Deduplicated search hits");

            if !fresh.is_empty() {
                // Enrich
                if self.is_cancelled() {
                    return Ok(KeywordStatus::Skipped);
                }
                self.step(RunState::Enriching, index, ctx);
                let (records, owners) = self.enrich(&mut ctx.quota, &fresh).await?;

                // Filter
                if self.is_cancelled() {
                    return Ok(KeywordStatus::Skipped);
                }
                self.step(RunState::Filtering, index, ctx);
                let survivors = filter::filter(&records, &owners, &plan.criteria);
                metrics::ITEMS_FILTERED_OUT.inc_by((records.len() - survivors.len()) as u64);
                debug!(keyword, enriched = records.len(), kept = survivors.len(), "Filtered records");

                // Record
                if self.is_cancelled() {
                    return Ok(KeywordStatus::Skipped);
                }
                self.step(RunState::Recording, index, ctx);
                let today = Utc::now().date_naive();
                for record in survivors {
                    ctx.ledger.record(&record.id, today)?;
                    metrics::ITEMS_REPORTED.inc();
                    outcome.kept += 1;
                    ctx.kept += 1;
                    ctx.results.push(ReportedItem {
                        subscriber_count: owners
                            .get(&record.owner_id)
                            .and_then(|o| o.subscriber_count),
                        keyword: keyword.to_string(),
                        url: record.watch_url(),
                        record,
                    });
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
            if self.is_cancelled() {
                return Ok(KeywordStatus::Skipped);
            }
        }

        info!(
            keyword,
            scanned = outcome.scanned,
            fresh = outcome.fresh,
            kept = outcome.kept,
            "Keyword completed"
        );
        Ok(KeywordStatus::Completed)
    }

    /// Fetch details for `ids`, then owner info for the owners they reference.
    async fn enrich(
        &self,
        quota: &mut QuotaLedger,
        ids: &[String],
    ) -> Result<(Vec<ItemRecord>, HashMap<String, OwnerInfo>), CatalogError> {
        let mut records = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_BATCH_SIZE) {
            records.extend(self.client.fetch_details(quota, chunk).await?);
        }

        // Records without an owner id are filtered as unknown owners.
        let mut owner_ids: Vec<String> = Vec::new();
        let mut seen_owners = HashSet::new();
        for record in &records {
            if !record.owner_id.is_empty() && seen_owners.insert(record.owner_id.as_str()) {
                owner_ids.push(record.owner_id.clone());
            }
        }

        let mut owners = HashMap::with_capacity(owner_ids.len());
        for chunk in owner_ids.chunks(MAX_BATCH_SIZE) {
            owners.extend(self.client.fetch_owner_info(quota, chunk).await?);
        }

        Ok((records, owners))
    }

    fn finalize(
        &self,
        run_id: String,
        started_at: chrono::DateTime<Utc>,
        estimated_quota: u64,
        keywords: Vec<KeywordOutcome>,
        error: Option<String>,
        ctx: RunContext,
    ) -> RunReport {
        self.emit(
            RunState::Finalizing,
            keywords.len().saturating_sub(1),
            ctx.keyword_total,
            ctx.scanned,
            ctx.kept,
            ctx.skipped,
        );

        for outcome in &keywords {
            metrics::KEYWORD_OUTCOMES
                .with_label_values(&[outcome.status.as_str()])
                .inc();
        }

        let run_metrics = RunMetrics {
            keywords_count: ctx.keyword_total,
            results_count: ctx.results.len(),
            quota_used: ctx.quota.used(),
            error,
        };

        info!(
            run_id = %run_id,
            keywords = run_metrics.keywords_count,
            results = run_metrics.results_count,
            quota_used = run_metrics.quota_used,
            estimated_quota,
            failed = run_metrics.error.is_some(),
            "Run finished"
        );

        self.emit(
            RunState::Done,
            keywords.len().saturating_sub(1),
            ctx.keyword_total,
            ctx.scanned,
            ctx.kept,
            ctx.skipped,
        );

        RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            estimated_quota,
            keywords,
            results: ctx.results,
            metrics: run_metrics,
        }
    }

    fn step(&self, state: RunState, index: usize, ctx: &RunContext) {
        debug!(state = state.as_str(), keyword_index = index, "Run state");
        self.emit(
            state,
            index,
            ctx.keyword_total,
            ctx.scanned,
            ctx.kept,
            ctx.skipped,
        );
    }

    fn emit(
        &self,
        state: RunState,
        keyword_index: usize,
        keyword_total: usize,
        scanned: usize,
        kept: usize,
        skipped: usize,
    ) {
        if let Some(callback) = &self.progress {
            callback(&RunProgress {
                state,
                keyword_index,
                keyword_total,
                scanned,
                kept,
                skipped,
            });
        }
    }
}

/// Ids not yet reported, first occurrence only, in search order.
fn dedupe(ids: &[String], ledger: &SeenLedger) -> Vec<String> {
    let mut unique = HashSet::new();
    ids.iter()
        .filter(|id| !ledger.contains(id) && unique.insert(id.as_str()))
        .cloned()
        .collect()
}
