//! Mock catalog provider for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::raw::{ChannelResource, SearchListResponse, VideoResource};
use crate::catalog::{CatalogApi, CatalogError, SearchOptions};

/// A recorded provider call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCatalogCall {
    Search {
        query: String,
        page_token: Option<String>,
    },
    ListVideos {
        ids: Vec<String>,
    },
    ListChannels {
        ids: Vec<String>,
    },
}

/// Mock implementation of the CatalogApi trait.
///
/// Provides controllable behavior for testing:
/// - Return configured search pages, videos and channels
/// - Track calls for assertions
/// - Simulate failures, once or per query
///
/// Unknown search queries return an empty page. Unknown video and channel
/// ids are silently omitted, like the real provider does.
#[derive(Debug)]
pub struct MockCatalogApi {
    /// Search pages by (query, page token).
    pages: Arc<RwLock<HashMap<(String, Option<String>), SearchListResponse>>>,
    /// Videos by id.
    videos: Arc<RwLock<HashMap<String, VideoResource>>>,
    /// Channels by id.
    channels: Arc<RwLock<HashMap<String, ChannelResource>>>,
    /// Queries whose searches always fail.
    failing_queries: Arc<RwLock<HashSet<String>>>,
    /// Video ids whose detail lookups always fail.
    failing_videos: Arc<RwLock<HashSet<String>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedCatalogCall>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
}

impl Default for MockCatalogApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogApi {
    /// Create a new empty mock.
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
            videos: Arc::new(RwLock::new(HashMap::new())),
            channels: Arc::new(RwLock::new(HashMap::new())),
            failing_queries: Arc::new(RwLock::new(HashSet::new())),
            failing_videos: Arc::new(RwLock::new(HashSet::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the first result page for `query`.
    pub async fn add_search_page(&self, query: &str, response: SearchListResponse) {
        self.add_search_page_at(query, None, response).await;
    }

    /// Set the page returned for `query` when requested with `page_token`.
    pub async fn add_search_page_at(
        &self,
        query: &str,
        page_token: Option<&str>,
        response: SearchListResponse,
    ) {
        self.pages
            .write()
            .await
            .insert((query.to_string(), page_token.map(String::from)), response);
    }

    /// Add a video resource.
    pub async fn add_video(&self, video: VideoResource) {
        if let Some(id) = video.id.clone() {
            self.videos.write().await.insert(id, video);
        }
    }

    /// Add a channel resource.
    pub async fn add_channel(&self, channel: ChannelResource) {
        if let Some(id) = channel.id.clone() {
            self.channels.write().await.insert(id, channel);
        }
    }

    /// Make every search for `query` fail with a server error.
    pub async fn fail_search_for(&self, query: &str) {
        self.failing_queries.write().await.insert(query.to_string());
    }

    /// Make every detail lookup that includes `video_id` fail.
    pub async fn fail_details_for(&self, video_id: &str) {
        self.failing_videos.write().await.insert(video_id.to_string());
    }

    /// Make the next call fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCatalogCall> {
        self.calls.read().await.clone()
    }

    /// Number of calls that reached the mock.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Number of search calls that reached the mock.
    pub async fn search_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, RecordedCatalogCall::Search { .. }))
            .count()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    async fn record(&self, call: RecordedCatalogCall) -> Result<(), CatalogError> {
        self.calls.write().await.push(call);
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogApi for MockCatalogApi {
    async fn search_page(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchListResponse, CatalogError> {
        self.record(RecordedCatalogCall::Search {
            query: query.to_string(),
            page_token: options.page_token.clone(),
        })
        .await?;

        if self.failing_queries.read().await.contains(query) {
            return Err(CatalogError::ApiError {
                status: 500,
                message: format!("search for '{}' failed", query),
            });
        }

        let key = (query.to_string(), options.page_token.clone());
        Ok(self
            .pages
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_videos(&self, ids: &[String]) -> Result<Vec<VideoResource>, CatalogError> {
        self.record(RecordedCatalogCall::ListVideos { ids: ids.to_vec() })
            .await?;

        let failing = self.failing_videos.read().await;
        if let Some(id) = ids.iter().find(|id| failing.contains(*id)) {
            return Err(CatalogError::ApiError {
                status: 503,
                message: format!("lookup of '{}' failed", id),
            });
        }

        let videos = self.videos.read().await;
        Ok(ids.iter().filter_map(|id| videos.get(id).cloned()).collect())
    }

    async fn list_channels(&self, ids: &[String]) -> Result<Vec<ChannelResource>, CatalogError> {
        self.record(RecordedCatalogCall::ListChannels { ids: ids.to_vec() })
            .await?;

        let channels = self.channels.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| channels.get(id).cloned())
            .collect())
    }
}
