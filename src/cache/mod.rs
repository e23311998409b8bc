//! Caching layer
//!
//! The leaderboard is the only expensive read in the service: it aggregates
//! every user's activity in one pass. [`LeaderboardCache`] keeps the last
//! ranking in memory for a TTL and recomputes it when it expires or when the
//! `leaderboard` tag is invalidated.

pub mod leaderboard;

pub use leaderboard::{LeaderboardCache, LeaderboardSnapshot, LEADERBOARD_TAG};

use std::time::Duration;

/// Default leaderboard TTL (5 minutes)
pub const DEFAULT_LEADERBOARD_TTL_SECS: u64 = 300;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a computed ranking is served before recomputation
    pub leaderboard_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            leaderboard_ttl: Duration::from_secs(DEFAULT_LEADERBOARD_TTL_SECS),
        }
    }
}

impl CacheConfig {
    pub fn with_ttl_secs(secs: u64) -> Self {
        Self {
            leaderboard_ttl: Duration::from_secs(secs),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub generation: u64,
    pub ttl_secs: u64,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}
