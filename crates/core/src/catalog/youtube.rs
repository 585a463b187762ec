//! YouTube Data API v3 transport.
//!
//! Requires an API key. Each call maps to one `GET` on the `search`, `videos`
//! or `channels` endpoint; quota is handled by [`CatalogClient`](super::CatalogClient).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::raw::{ChannelResource, ListResponse, SearchListResponse, VideoResource};
use super::{CatalogApi, CatalogError, SearchOptions};
use crate::config::CatalogConfig;

/// YouTube Data API client.
pub struct YouTubeApi {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YouTubeApi {
    /// Create a new client from the `[catalog]` configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.api_key.is_empty() {
            return Err(CatalogError::NotConfigured(
                "YouTube API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn get(&self, endpoint: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(&[("key", self.api_key.as_str())])
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, CatalogError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout
            } else {
                CatalogError::HttpError(e)
            }
        })?;

        let status = response.status();
        // quotaExceeded arrives as 403 and is a hard failure like any other status.
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: truncate(&body),
            });
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout
            } else {
                CatalogError::ParseError(format!("Failed to parse {} response: {}", what, e))
            }
        })
    }
}

#[async_trait]
impl CatalogApi for YouTubeApi {
    async fn search_page(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchListResponse, CatalogError> {
        debug!(
            "YouTube search: query='{}', region={:?}, language={:?}",
            query, options.region, options.language
        );

        let page_size = options.page_size.to_string();
        let mut request = self.get("search").query(&[
            ("part", "snippet"),
            ("type", "video"),
            ("maxResults", page_size.as_str()),
            ("q", query),
        ]);

        if let Some(region) = &options.region {
            request = request.query(&[("regionCode", region.as_str())]);
        }
        if let Some(language) = &options.language {
            request = request.query(&[("relevanceLanguage", language.as_str())]);
        }
        if let Some(token) = &options.page_token {
            request = request.query(&[("pageToken", token.as_str())]);
        }

        self.send(request, "search").await
    }

    async fn list_videos(&self, ids: &[String]) -> Result<Vec<VideoResource>, CatalogError> {
        debug!("YouTube videos lookup: {} ids", ids.len());

        let joined = ids.join(",");
        let request = self.get("videos").query(&[
            ("part", "snippet,statistics,contentDetails"),
            ("id", joined.as_str()),
        ]);

        let response: ListResponse<VideoResource> = self.send(request, "videos").await?;
        Ok(response.items)
    }

    async fn list_channels(&self, ids: &[String]) -> Result<Vec<ChannelResource>, CatalogError> {
        debug!("YouTube channels lookup: {} ids", ids.len());

        let joined = ids.join(",");
        let request = self
            .get("channels")
            .query(&[("part", "statistics"), ("id", joined.as_str())]);

        let response: ListResponse<ChannelResource> = self.send(request, "channels").await?;
        Ok(response.items)
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}
