//! In-process quota ledger.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ASSUMED_RESULTS_PER_PAGE, DETAIL_COST, OWNER_COST, SEARCH_COST};

/// Snapshot of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    pub used: u64,
    pub cap: u64,
}

/// Tracks consumed quota against a cap.
///
/// `used` only grows, except through [`QuotaLedger::reset`]. The ledger never
/// refuses a charge: callers gate each call with [`QuotaLedger::can_afford`]
/// first. It is not synchronized; one orchestration owns it at a time.
#[derive(Debug, Clone)]
pub struct QuotaLedger {
    used: u64,
    cap: u64,
}

impl QuotaLedger {
    pub fn new(cap: u64) -> Self {
        Self { used: 0, cap }
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn cap(&self) -> u64 {
        self.cap
    }

    /// Units left before the cap is reached.
    pub fn remaining(&self) -> u64 {
        self.cap.saturating_sub(self.used)
    }

    pub fn state(&self) -> QuotaState {
        QuotaState {
            used: self.used,
            cap: self.cap,
        }
    }

    /// True iff `used + cost <= cap`.
    pub fn can_afford(&self, cost: u64) -> bool {
        self.used
            .checked_add(cost)
            .is_some_and(|total| total <= self.cap)
    }

    /// Record spent units. Does not check the cap.
    pub fn charge(&mut self, cost: u64) {
        self.used = self.used.saturating_add(cost);
        debug!(cost, used = self.used, cap = self.cap, "Quota charged");
    }

    /// Start a fresh billing period.
    pub fn reset(&mut self) {
        self.used = 0;
    }
}

/// Planning estimate of the quota a run will consume.
///
/// Assumes every search page yields [`ASSUMED_RESULTS_PER_PAGE`] items and that
/// each of them costs one detail and one owner lookup. Real usage differs:
/// detail and owner lookups are batched (so this over-counts them), and
/// keywords that come back empty stop paginating early. Treat the number as
/// advisory only; it does not bound actual spending.
pub fn estimate(keyword_count: u64, pages_per_keyword: u64) -> u64 {
    let pages = keyword_count.saturating_mul(pages_per_keyword);
    let search = pages.saturating_mul(SEARCH_COST);
    let enrichment = ASSUMED_RESULTS_PER_PAGE
        .saturating_mul(pages)
        .saturating_mul(DETAIL_COST + OWNER_COST);
    search.saturating_add(enrichment)
}
