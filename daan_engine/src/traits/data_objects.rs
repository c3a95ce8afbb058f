use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db_types::{Donation, Event, MinorUnits};

pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A validated page request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_PAGE_SIZE }
    }
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Result<Self, String> {
        if page < 1 {
            return Err("page must be at least 1".to_string());
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(format!("limit must be between 1 and {MAX_PAGE_SIZE}"));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationPage {
    pub donations: Vec<Donation>,
    pub page: u32,
    pub limit: u32,
    /// Total number of donations the devotee has made, across all pages
    pub total: i64,
}

impl DonationPage {
    pub fn total_pages(&self) -> i64 {
        let limit = i64::from(self.limit.max(1));
        (self.total + limit - 1) / limit
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct DonationStats {
    /// Sum of captured donations only
    pub total_donated: MinorUnits,
    pub captured_count: i64,
    pub pending_count: i64,
    pub failed_count: i64,
    /// Number of distinct organizations that received at least one captured donation
    pub organizations_supported: i64,
}

/// What happened to the event total when a donation was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundingOutcome {
    /// The amount was added to the event's raised total. Carries the updated event.
    Credited(Event),
    /// The event no longer exists or is inactive. The donation is still captured.
    Skipped(i64),
    /// The donation is not linked to an event.
    NotApplicable,
}

impl FundingOutcome {
    pub fn is_credited(&self) -> bool {
        matches!(self, Self::Credited(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    pub donation: Donation,
    /// `false` when the donation had already been captured and this call changed nothing
    pub newly_captured: bool,
    pub funding: FundingOutcome,
}

impl CaptureResult {
    pub fn replay(donation: Donation) -> Self {
        Self { donation, newly_captured: false, funding: FundingOutcome::NotApplicable }
    }
}
