//! Normalized catalog records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Provider limit on ids per detail/owner lookup.
pub const MAX_BATCH_SIZE: usize = 50;

/// Normalized view of one catalog item (a video).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemRecord {
    /// Video id, the primary key.
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Channel id of the uploader.
    pub owner_id: String,
    /// Channel display name.
    pub owner_title: String,
    pub view_count: u64,
    pub duration_seconds: u64,
    pub published_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

impl ItemRecord {
    /// Whole minutes, rounded down.
    pub fn duration_minutes(&self) -> u64 {
        self.duration_seconds / 60
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// Subscriber information for one owner (channel).
///
/// `subscriber_count` is `None` when the channel does not disclose it or the
/// lookup returned nothing for this owner. That is "unknown", never zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_count: Option<u64>,
    #[serde(default)]
    pub hidden: bool,
}

impl OwnerInfo {
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Parameters for one search page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub page_size: u32,
    /// Continuation token from the previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            region: None,
            language: None,
            page_size: MAX_BATCH_SIZE as u32,
            page_token: None,
        }
    }
}

/// Item ids returned by one search page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchPage {
    pub item_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl SearchPage {
    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(duration_seconds: u64) -> ItemRecord {
        ItemRecord {
            id: "dQw4w9WgXcQ".to_string(),
            title: "Title".to_string(),
            description: String::new(),
            tags: vec![],
            owner_id: "UC1".to_string(),
            owner_title: "Channel".to_string(),
            view_count: 0,
            duration_seconds,
            published_at: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            region_code: None,
            language_code: None,
        }
    }

    #[test]
    fn test_duration_minutes_floors() {
        assert_eq!(record(0).duration_minutes(), 0);
        assert_eq!(record(59).duration_minutes(), 0);
        assert_eq!(record(60).duration_minutes(), 1);
        assert_eq!(record(299).duration_minutes(), 4);
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            record(1).watch_url(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_owner_info_unknown_is_not_zero() {
        let info = OwnerInfo::unknown();
        assert_eq!(info.subscriber_count, None);
        assert!(!info.hidden);
    }
}
