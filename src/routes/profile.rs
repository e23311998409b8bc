//! GET /api/users/{id}/stats
//!
//! Profile statistics for a single user, computed on every request from
//! that user's activity only.

use chrono::Utc;
use hyper::StatusCode;
use serde::Serialize;

use super::response::{json_response, HttpResponse};
use crate::scoring::{aggregate, compute_points, ring_score, ActivityCounts, ScoreBreakdown};
use crate::server::AppState;
use crate::types::{Result, RewardsError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub pages: u64,
    pub edits: u64,
    pub comments: u64,
    pub unique_contributions: u64,
    pub account_age_days: u64,
}

impl From<ActivityCounts> for ProfileStats {
    fn from(c: ActivityCounts) -> Self {
        Self {
            pages: c.pages_created,
            edits: c.edit_slots,
            comments: c.comment_slots,
            unique_contributions: c.unique_edited_pages,
            account_age_days: c.account_age_days,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub stats: ProfileStats,
    /// Ring score, 0-100
    pub score: u8,
    /// Linear total
    pub points: u64,
    pub breakdown: ScoreBreakdown,
}

impl ProfileResponse {
    pub fn from_counts(counts: ActivityCounts) -> Self {
        let breakdown = compute_points(&counts);
        Self {
            score: ring_score(&counts),
            points: breakdown.total(),
            breakdown,
            stats: counts.into(),
        }
    }
}

pub async fn get_user_stats(state: &AppState, user_id: &str) -> Result<HttpResponse> {
    let activity = state
        .store
        .user_activity(user_id)
        .await?
        .ok_or_else(|| RewardsError::NotFound(format!("User {}", user_id)))?;

    let counts = aggregate(&activity, Utc::now());
    Ok(json_response(StatusCode::OK, &ProfileResponse::from_counts(counts)))
}
