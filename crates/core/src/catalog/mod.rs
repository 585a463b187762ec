//! Catalog access: the YouTube Data API and the quota-gated client on top.
//!
//! [`CatalogApi`] is the raw transport seam (one call per request kind).
//! [`CatalogClient`] wraps a transport, applies the quota contract to every
//! call and normalizes responses into [`ItemRecord`]s and [`OwnerInfo`].

mod client;
mod duration;
pub mod raw;
mod types;
mod youtube;

pub use client::CatalogClient;
pub use duration::parse_duration_secs;
pub use types::*;
pub use youtube::YouTubeApi;

use async_trait::async_trait;
use thiserror::Error;

use raw::{ChannelResource, SearchListResponse, VideoResource};

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// More ids than the provider accepts in one lookup.
    #[error("Batch of {len} ids exceeds the limit of {max}")]
    BatchTooLarge { len: usize, max: usize },

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Raw catalog transport.
///
/// Implementations issue exactly one upstream request per call and know
/// nothing about quota.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of keyword search results.
    async fn search_page(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchListResponse, CatalogError>;

    /// Look up a batch of videos by id.
    async fn list_videos(&self, ids: &[String]) -> Result<Vec<VideoResource>, CatalogError>;

    /// Look up a batch of channels by id.
    async fn list_channels(&self, ids: &[String]) -> Result<Vec<ChannelResource>, CatalogError>;
}
