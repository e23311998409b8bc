//! Per-request session and admin checks
//!
//! Nothing here is cached: each admin request re-verifies its token and
//! re-compares the wallet address against the configured administrator.

use hyper::header::{HeaderMap, AUTHORIZATION};
use tracing::warn;

use super::jwt::{extract_token_from_header, Claims, JwtValidator};
use crate::types::{Result, RewardsError};

/// Verify the bearer token on a request
pub fn authenticate(headers: &HeaderMap, jwt: &JwtValidator) -> Result<Claims> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = extract_token_from_header(header)
        .ok_or_else(|| RewardsError::Unauthorized("No token provided".into()))?;

    jwt.verify_token(token)
}

/// Require the session to belong to the administrator wallet
///
/// With no administrator configured every caller is rejected.
pub fn require_admin(claims: &Claims, admin_wallet: Option<&str>) -> Result<()> {
    let Some(admin) = admin_wallet.map(str::trim).filter(|a| !a.is_empty()) else {
        warn!("Admin request rejected: no administrator wallet configured");
        return Err(RewardsError::Forbidden("Administrator not configured".into()));
    };

    if claims.wallet_address != admin {
        warn!(user = %claims.sub, "Admin request from non-admin wallet");
        return Err(RewardsError::Forbidden("Admin permission required".into()));
    }

    Ok(())
}
