//! Testing utilities and a mock catalog provider.
//!
//! [`MockCatalogApi`] stands in for the remote video catalog so the client and
//! the pipeline can be driven end to end without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vidscout_core::catalog::CatalogClient;
//! use vidscout_core::testing::{fixtures, MockCatalogApi};
//!
//! let api = Arc::new(MockCatalogApi::new());
//! api.add_search_page("rust", fixtures::search_page(&["v1"], None)).await;
//! api.add_video(fixtures::video("v1", "UC1", 5000, "PT5M")).await;
//!
//! let client = CatalogClient::new(api.clone());
//! ```

mod mock_catalog_api;

pub use mock_catalog_api::{MockCatalogApi, RecordedCatalogCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;

    use crate::catalog::raw::{
        ChannelResource, ChannelStatistics, SearchListResponse, SearchResult, SearchResultId,
        VideoContentDetails, VideoResource, VideoSnippet, VideoStatistics,
    };
    use crate::catalog::ItemRecord;

    /// A search response listing `ids` as video hits.
    pub fn search_page(ids: &[&str], next_page_token: Option<&str>) -> SearchListResponse {
        SearchListResponse {
            items: ids
                .iter()
                .map(|id| SearchResult {
                    id: SearchResultId {
                        kind: Some("youtube#video".to_string()),
                        video_id: Some(id.to_string()),
                    },
                })
                .collect(),
            next_page_token: next_page_token.map(String::from),
        }
    }

    /// A complete video resource as the provider would return it.
    ///
    /// `duration` is an ISO-8601 duration such as `"PT5M"`.
    pub fn video(id: &str, channel_id: &str, views: u64, duration: &str) -> VideoResource {
        VideoResource {
            id: Some(id.to_string()),
            snippet: Some(VideoSnippet {
                published_at: Some("2024-03-01T12:00:00Z".to_string()),
                channel_id: Some(channel_id.to_string()),
                title: Some(format!("Video {}", id)),
                description: Some(format!("Description of {}", id)),
                channel_title: Some(format!("Channel {}", channel_id)),
                tags: vec!["test".to_string()],
                default_language: None,
                region_code: None,
            }),
            statistics: Some(VideoStatistics {
                view_count: Some(views.to_string()),
            }),
            content_details: Some(VideoContentDetails {
                duration: Some(duration.to_string()),
            }),
        }
    }

    /// A channel resource. `subscribers: None` omits the count entirely.
    pub fn channel(id: &str, subscribers: Option<u64>, hidden: bool) -> ChannelResource {
        ChannelResource {
            id: Some(id.to_string()),
            statistics: Some(ChannelStatistics {
                subscriber_count: subscribers.map(|n| n.to_string()),
                hidden_subscriber_count: Some(hidden),
            }),
        }
    }

    /// A normalized record with no region or language.
    pub fn item_record(id: &str, owner_id: &str, views: u64, duration_seconds: u64) -> ItemRecord {
        ItemRecord {
            id: id.to_string(),
            title: format!("Video {}", id),
            description: String::new(),
            tags: Vec::new(),
            owner_id: owner_id.to_string(),
            owner_title: format!("Channel {}", owner_id),
            view_count: views,
            duration_seconds,
            published_at: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            region_code: None,
            language_code: None,
        }
    }
}
