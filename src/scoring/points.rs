//! Linear contribution points
//!
//! Points rank the leaderboard and size each user's reward share. The weight
//! table is policy and must stay stable across releases so historical
//! distributions remain reproducible.

use serde::Serialize;

use super::activity::ActivityCounts;

/// Points per authored page
pub const PAGE_WEIGHT: u64 = 150;
/// Points per edit slot
pub const EDIT_WEIGHT: u64 = 80;
/// Points per distinct edited page
pub const CONTRIBUTION_WEIGHT: u64 = 80;
/// Points per comment slot
pub const COMMENT_WEIGHT: u64 = 70;
/// Points per completed tenure period
pub const TENURE_WEIGHT: u64 = 50;
/// Length of one tenure period in days
pub const TENURE_PERIOD_DAYS: u64 = 30;

/// Per-category point breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub pages: u64,
    pub edits: u64,
    pub contributions: u64,
    pub comments: u64,
    pub tenure: u64,
}

impl ScoreBreakdown {
    /// Sum of every category
    pub fn total(&self) -> u64 {
        self.pages
            .saturating_add(self.edits)
            .saturating_add(self.contributions)
            .saturating_add(self.comments)
            .saturating_add(self.tenure)
    }
}

/// Compute the weighted point breakdown for a set of counts
pub fn compute_points(counts: &ActivityCounts) -> ScoreBreakdown {
    ScoreBreakdown {
        pages: counts.pages_created.saturating_mul(PAGE_WEIGHT),
        edits: counts.edit_slots.saturating_mul(EDIT_WEIGHT),
        contributions: counts.unique_edited_pages.saturating_mul(CONTRIBUTION_WEIGHT),
        comments: counts.comment_slots.saturating_mul(COMMENT_WEIGHT),
        tenure: (counts.account_age_days / TENURE_PERIOD_DAYS).saturating_mul(TENURE_WEIGHT),
    }
}

/// Total points for a set of counts
pub fn total_points(counts: &ActivityCounts) -> u64 {
    compute_points(counts).total()
}
