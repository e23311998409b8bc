//! Health and status endpoints
//!
//! - /health, /healthz: liveness, always 200 while the process serves
//! - /status: runtime information including leaderboard cache counters

use chrono::Utc;
use hyper::StatusCode;
use serde::Serialize;

use super::response::{json_response, HttpResponse};
use crate::cache::CacheStats;
use crate::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub timestamp: String,
    pub mode: &'static str,
    pub node_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub node_id: String,
    pub dev_mode: bool,
    pub storage: &'static str,
    pub admin_configured: bool,
    pub uptime_secs: u64,
    pub leaderboard_cache: CacheStats,
    pub cache_hit_rate: f64,
}

pub fn health_check(state: &AppState) -> HttpResponse {
    let health = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode { "development" } else { "production" },
        node_id: state.args.node_id.to_string(),
    };

    json_response(StatusCode::OK, &health)
}

pub fn status_check(state: &AppState) -> HttpResponse {
    let cache = state.leaderboard.stats();

    let status = StatusResponse {
        service: "wiki-rewards",
        version: env!("CARGO_PKG_VERSION"),
        node_id: state.args.node_id.to_string(),
        dev_mode: state.args.dev_mode,
        storage: state.storage.as_str(),
        admin_configured: state.args.admin_wallet().is_some(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        cache_hit_rate: cache.hit_rate(),
        leaderboard_cache: cache,
    };

    json_response(StatusCode::OK, &status)
}
