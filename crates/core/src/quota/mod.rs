//! Quota accounting for the catalog API.
//!
//! The provider grants a daily budget of abstract cost units. Every catalog
//! call has a fixed price; the [`QuotaLedger`] tracks what has been spent and
//! answers whether the next call still fits under the cap.

mod ledger;

pub use ledger::{estimate, QuotaLedger, QuotaState};

use serde::{Deserialize, Serialize};

/// Cost of one keyword search page.
pub const SEARCH_COST: u64 = 100;
/// Cost of one item-detail batch.
pub const DETAIL_COST: u64 = 1;
/// Cost of one owner batch.
pub const OWNER_COST: u64 = 1;
/// Results per search page assumed by [`estimate`].
pub const ASSUMED_RESULTS_PER_PAGE: u64 = 10;

/// The three priced request kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Search,
    Details,
    Owners,
}

impl RequestKind {
    /// Fixed quota cost of one call of this kind.
    pub fn cost(self) -> u64 {
        match self {
            RequestKind::Search => SEARCH_COST,
            RequestKind::Details => DETAIL_COST,
            RequestKind::Owners => OWNER_COST,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Search => "search",
            RequestKind::Details => "details",
            RequestKind::Owners => "owners",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
