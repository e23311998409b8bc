//! GET /api/leaderboard
//!
//! Serves a page of the cached ranking. The ETag identifies the whole
//! ranking, so a client holding any page can revalidate with
//! `If-None-Match` and get a 304 until the ranking changes.

use hyper::StatusCode;

use super::response::{json_response_with, not_modified, HttpResponse};
use super::ApiRequest;
use crate::scoring::{paginate, Pagination};
use crate::server::AppState;
use crate::types::Result;

pub async fn get_leaderboard(state: &AppState, req: &ApiRequest) -> Result<HttpResponse> {
    let snapshot = state.leaderboard.get_or_refresh(state.store.as_ref()).await?;

    if let Some(header) = req.header("If-None-Match") {
        if etag_matches(header, &snapshot.etag) {
            return Ok(not_modified(&snapshot.etag));
        }
    }

    let pagination = Pagination::from_query(req.query.as_deref());
    let page = paginate(&snapshot.entries, pagination);

    let max_age = state
        .leaderboard
        .ttl()
        .as_secs()
        .saturating_sub(snapshot.age_secs());
    let cache_control = format!("public, max-age={}", max_age);
    let last_computed = snapshot.computed_at.to_rfc3339();

    Ok(json_response_with(
        StatusCode::OK,
        &page,
        &[
            ("ETag", snapshot.etag.as_str()),
            ("Cache-Control", cache_control.as_str()),
            ("X-Computed-At", last_computed.as_str()),
        ],
    ))
}

/// `If-None-Match` check: `*`, a single tag or a comma separated list
fn etag_matches(header: &str, etag: &str) -> bool {
    header
        .split(',')
        .map(|t| t.trim().trim_start_matches("W/"))
        .any(|t| t == "*" || t == etag)
}
