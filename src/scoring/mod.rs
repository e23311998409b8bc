//! Contribution scoring
//!
//! Everything in here is pure and synchronous:
//!
//! - [`activity`] turns raw page events into deduplicated counts
//! - [`points`] applies the linear weight table used for ranking and rewards
//! - [`ring`] computes the dampened 0-100 profile score
//! - [`leaderboard`] ranks users and slices pages
//! - [`rewards`] splits a treasury balance into per-user payouts

pub mod activity;
pub mod leaderboard;
pub mod points;
pub mod rewards;
pub mod ring;

pub use activity::{
    aggregate, aggregate_batch, ActivityBatch, ActivityCounts, AuthoredEvent, PageEvent,
    UserActivity, UserCounts, UserRef,
};
pub use leaderboard::{paginate, rank, LeaderboardEntry, LeaderboardPage, Pagination};
pub use points::{compute_points, total_points, ScoreBreakdown};
pub use rewards::{
    distribute, AirdropSnapshot, ExportFormat, NewAirdrop, RewardDistribution, RewardShare,
};
pub use ring::ring_score;
