//! Quota-gated catalog client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, NaiveDate};
use tracing::{debug, warn};

use super::duration::parse_duration_secs;
use super::raw::{ChannelResource, VideoResource};
use super::{
    CatalogApi, CatalogError, ItemRecord, OwnerInfo, SearchOptions, SearchPage, MAX_BATCH_SIZE,
};
use crate::metrics;
use crate::quota::{QuotaLedger, RequestKind};

/// Issues catalog requests under a quota budget.
///
/// Every call checks [`QuotaLedger::can_afford`] before dispatch. An
/// unaffordable call is skipped and yields an empty result rather than an
/// error, so a run degrades instead of aborting. A dispatched call is always
/// charged, even when it fails, because the provider bills failed requests.
#[derive(Clone)]
pub struct CatalogClient {
    api: Arc<dyn CatalogApi>,
}

impl CatalogClient {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    /// Search one page of video ids for `query`.
    ///
    /// Hits without a video id (channels, playlists) are dropped. Returns an
    /// empty page without calling out when the quota cannot cover a search.
    pub async fn search(
        &self,
        quota: &mut QuotaLedger,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchPage, CatalogError> {
        if !Self::admit(quota, RequestKind::Search) {
            return Ok(SearchPage::default());
        }

        debug!(query, page_token = ?options.page_token, "Catalog search");
        let started = Instant::now();
        let result = self.api.search_page(query, options).await;
        Self::settle(quota, RequestKind::Search, started, result.is_ok());
        let response = result?;

        let item_ids = response
            .items
            .into_iter()
            .filter_map(|hit| hit.id.video_id)
            .filter(|id| !id.is_empty())
            .collect();

        Ok(SearchPage {
            item_ids,
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    /// Fetch and normalize item details for up to [`MAX_BATCH_SIZE`] ids in a
    /// single call. Output order follows the provider's response.
    pub async fn fetch_details(
        &self,
        quota: &mut QuotaLedger,
        ids: &[String],
    ) -> Result<Vec<ItemRecord>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        check_batch(ids)?;
        if !Self::admit(quota, RequestKind::Details) {
            return Ok(Vec::new());
        }

        debug!(count = ids.len(), "Catalog detail lookup");
        let started = Instant::now();
        let result = self.api.list_videos(ids).await;
        Self::settle(quota, RequestKind::Details, started, result.is_ok());

        Ok(result?.into_iter().filter_map(normalize_video).collect())
    }

    /// Fetch owner info for up to [`MAX_BATCH_SIZE`] owner ids in a single call.
    ///
    /// Owners missing from the response are absent from the map; callers
    /// should treat them as [`OwnerInfo::unknown`].
    pub async fn fetch_owner_info(
        &self,
        quota: &mut QuotaLedger,
        owner_ids: &[String],
    ) -> Result<HashMap<String, OwnerInfo>, CatalogError> {
        if owner_ids.is_empty() {
            return Ok(HashMap::new());
        }
        check_batch(owner_ids)?;
        if !Self::admit(quota, RequestKind::Owners) {
            return Ok(HashMap::new());
        }

        debug!(count = owner_ids.len(), "Catalog owner lookup");
        let started = Instant::now();
        let result = self.api.list_channels(owner_ids).await;
        Self::settle(quota, RequestKind::Owners, started, result.is_ok());

        Ok(result?.into_iter().filter_map(normalize_channel).collect())
    }

    fn admit(quota: &QuotaLedger, kind: RequestKind) -> bool {
        if quota.can_afford(kind.cost()) {
            return true;
        }
        warn!(
            kind = kind.as_str(),
            cost = kind.cost(),
            used = quota.used(),
            cap = quota.cap(),
            "Quota cap reached, skipping catalog call"
        );
        metrics::QUOTA_SHORT_CIRCUITS
            .with_label_values(&[kind.as_str()])
            .inc();
        false
    }

    fn settle(quota: &mut QuotaLedger, kind: RequestKind, started: Instant, ok: bool) {
        quota.charge(kind.cost());

        let status = if ok { "success" } else { "error" };
        metrics::CATALOG_REQUESTS
            .with_label_values(&[kind.as_str(), status])
            .inc();
        metrics::CATALOG_REQUEST_DURATION
            .with_label_values(&[kind.as_str()])
            .observe(started.elapsed().as_secs_f64());
        metrics::QUOTA_UNITS_CHARGED
            .with_label_values(&[kind.as_str()])
            .inc_by(kind.cost());
    }
}

fn check_batch(ids: &[String]) -> Result<(), CatalogError> {
    if ids.len() > MAX_BATCH_SIZE {
        return Err(CatalogError::BatchTooLarge {
            len: ids.len(),
            max: MAX_BATCH_SIZE,
        });
    }
    Ok(())
}

fn normalize_video(video: VideoResource) -> Option<ItemRecord> {
    let id = video.id.filter(|id| !id.is_empty())?;
    let Some(snippet) = video.snippet else {
        warn!(id = %id, "Dropping video without snippet");
        return None;
    };

    let Some(published_at) = snippet.published_at.as_deref().and_then(parse_date) else {
        warn!(id = %id, published_at = ?snippet.published_at, "Dropping video with unparseable publish date");
        return None;
    };

    let view_count = video
        .statistics
        .and_then(|s| s.view_count)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    let duration_seconds = match video.content_details.and_then(|c| c.duration) {
        Some(raw) => parse_duration_secs(&raw).unwrap_or_else(|| {
            debug!(id = %id, duration = %raw, "Unparseable duration, using 0");
            0
        }),
        None => 0,
    };

    Some(ItemRecord {
        id,
        title: snippet.title.unwrap_or_default(),
        description: snippet.description.unwrap_or_default(),
        tags: snippet.tags,
        owner_id: snippet.channel_id.unwrap_or_default(),
        owner_title: snippet.channel_title.unwrap_or_default(),
        view_count,
        duration_seconds,
        published_at,
        region_code: snippet.region_code.filter(|r| !r.is_empty()),
        language_code: snippet.default_language.filter(|l| !l.is_empty()),
    })
}

fn normalize_channel(channel: ChannelResource) -> Option<(String, OwnerInfo)> {
    let id = channel.id.filter(|id| !id.is_empty())?;
    let stats = channel.statistics.unwrap_or_default();

    let info = OwnerInfo {
        subscriber_count: stats
            .subscriber_count
            .and_then(|s| s.parse::<u64>().ok()),
        hidden: stats.hidden_subscriber_count.unwrap_or(false),
    };
    Some((id, info))
}

/// RFC 3339 timestamp to calendar date, falling back to a leading `YYYY-MM-DD`.
fn parse_date(value: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| {
            value
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        })
}
