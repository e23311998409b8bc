//! Admin reward endpoints
//!
//! Every handler here starts with [`authorize_admin`], which re-verifies the
//! session and the administrator wallet on each call.

use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::response::{csv_response, json_response, HttpResponse};
use super::{authorize_admin, ApiRequest};
use crate::cache::LEADERBOARD_TAG;
use crate::scoring::{distribute, AirdropSnapshot, ExportFormat, NewAirdrop, RewardShare};
use crate::server::AppState;
use crate::treasury::TreasuryBalance;
use crate::types::{Result, RewardsError};

/// JSON body of the rewards view
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsView {
    pub treasury: TreasuryBalance,
    pub total_points: u64,
    pub editors: Vec<RewardShare>,
    pub airdrops: Vec<AirdropSnapshot>,
}

/// GET /api/admin/rewards[?format=csv]
pub async fn get_rewards(state: &AppState, req: &ApiRequest) -> Result<HttpResponse> {
    let claims = authorize_admin(state, req)?;
    let format = ExportFormat::parse(req.query_param("format").as_deref());

    let (treasury, snapshot) = tokio::try_join!(
        state.treasury.balance(),
        state.leaderboard.get_or_refresh(state.store.as_ref()),
    )?;

    let distribution = distribute(&snapshot.entries, treasury.balance);

    info!(
        admin = %claims.sub,
        balance = treasury.balance,
        editors = distribution.shares.len(),
        payable = distribution.payable().count(),
        csv = format == ExportFormat::Csv,
        "Computed reward distribution"
    );

    match format {
        ExportFormat::Csv => {
            let filename = format!("rewards-{}.csv", snapshot.computed_at.format("%Y-%m-%d"));
            Ok(csv_response(distribution.to_csv(), &filename))
        }
        ExportFormat::Json => {
            let airdrops = state.airdrops.list_airdrops().await?;
            let view = RewardsView {
                treasury,
                total_points: distribution.total_points,
                editors: distribution.shares,
                airdrops,
            };
            Ok(json_response(StatusCode::OK, &view))
        }
    }
}

/// GET /api/admin/airdrops
pub async fn list_airdrops(state: &AppState, req: &ApiRequest) -> Result<HttpResponse> {
    authorize_admin(state, req)?;
    let airdrops = state.airdrops.list_airdrops().await?;
    Ok(json_response(StatusCode::OK, &airdrops))
}

/// POST /api/admin/airdrops
///
/// Records what was paid. Shares are never recomputed here.
pub async fn create_airdrop(state: &AppState, req: &ApiRequest) -> Result<HttpResponse> {
    let claims = authorize_admin(state, req)?;

    let body: Value = serde_json::from_slice(&req.body)
        .map_err(|_| RewardsError::BadRequest("Request body must be JSON".into()))?;
    let airdrop = NewAirdrop::from_body(&body)?;

    let snapshot = state.airdrops.insert_airdrop(airdrop).await?;

    info!(
        admin = %claims.sub,
        id = %snapshot.id,
        tx_hash = %snapshot.tx_hash,
        total = snapshot.total_amount,
        editors = snapshot.editor_count,
        "Airdrop snapshot created"
    );

    Ok(json_response(StatusCode::CREATED, &snapshot))
}

#[derive(Debug, Deserialize)]
struct RevalidateQuery {
    tag: Option<String>,
}

#[derive(Debug, Serialize)]
struct RevalidateResponse {
    revalidated: bool,
    tag: String,
    now: i64,
}

/// POST /api/admin/revalidate?tag=leaderboard
pub async fn revalidate(state: &AppState, req: &ApiRequest) -> Result<HttpResponse> {
    authorize_admin(state, req)?;

    let query: RevalidateQuery = serde_urlencoded::from_str(req.query.as_deref().unwrap_or(""))
        .map_err(|e| RewardsError::BadRequest(format!("Invalid query: {}", e)))?;
    let tag = query
        .tag
        .filter(|t| !t.is_empty())
        .ok_or_else(|| RewardsError::BadRequest(format!("Missing tag (expected '{}')", LEADERBOARD_TAG)))?;

    let revalidated = state.leaderboard.invalidate_tag(&tag);

    Ok(json_response(
        StatusCode::OK,
        &RevalidateResponse {
            revalidated,
            tag,
            now: chrono::Utc::now().timestamp_millis(),
        },
    ))
}
