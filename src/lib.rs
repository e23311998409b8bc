//! wiki-rewards - contribution scoring and reward distribution for the wiki
//!
//! Turns raw wiki activity (authored pages, revisions, comments, account
//! age) into spam-resistant activity counts, a linear point score used for
//! ranking and token rewards, and a dampened 0-100 ring score for profiles.
//! The HTTP surface serves the leaderboard and profile stats publicly and
//! gives the administrator a payout table, a CSV export and an append-only
//! airdrop history.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod routes;
pub mod scoring;
pub mod server;
pub mod store;
pub mod treasury;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, RewardsError};
