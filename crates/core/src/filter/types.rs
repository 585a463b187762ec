//! Types for the filter engine.

use serde::{Deserialize, Serialize};

/// Declarative filter over enriched records.
///
/// All bounds are inclusive; `None` leaves that side unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views_min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views_max: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_min_minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_max_minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subs_min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subs_max: Option<u64>,
    /// Exact region match, only enforced when the record has a region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Exact language match, only enforced when the record has a language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Reject owners that hide their subscriber count.
    #[serde(default)]
    pub skip_hidden_subscribers: bool,
}

/// First check a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    Views,
    Duration,
    Region,
    Language,
    HiddenSubscribers,
    Subscribers,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Views => "views",
            Rejection::Duration => "duration",
            Rejection::Region => "region",
            Rejection::Language => "language",
            Rejection::HiddenSubscribers => "hidden_subscribers",
            Rejection::Subscribers => "subscribers",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
