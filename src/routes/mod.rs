//! HTTP routes
//!
//! | Route | Access |
//! |---|---|
//! | `GET /health`, `GET /healthz`, `GET /status` | public |
//! | `GET /api/leaderboard?page=&pageSize=` | public |
//! | `GET /api/users/{id}/stats` | public |
//! | `GET /api/admin/rewards[?format=csv]` | admin |
//! | `GET /api/admin/airdrops`, `POST /api/admin/airdrops` | admin |
//! | `POST /api/admin/revalidate?tag=leaderboard` | admin |

pub mod health;
pub mod leaderboard;
pub mod profile;
pub mod response;
pub mod rewards;

pub use health::{health_check, status_check};
pub use response::HttpResponse;

use bytes::Bytes;
use hyper::{HeaderMap, Method, StatusCode};
use tracing::{debug, error};

use crate::auth::{authenticate, require_admin, Claims};
use crate::server::AppState;
use crate::types::Result;

/// A fully read request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiRequest {
    pub fn get(path_and_query: &str) -> Self {
        Self::new(Method::GET, path_and_query, Bytes::new())
    }

    pub fn post(path_and_query: &str, body: impl Into<Bytes>) -> Self {
        Self::new(Method::POST, path_and_query, body.into())
    }

    fn new(method: Method, path_and_query: &str, body: Bytes) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (path_and_query.to_string(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Single query parameter value
    pub fn query_param(&self, name: &str) -> Option<String> {
        let pairs: Vec<(String, String)> = self
            .query
            .as_deref()
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default();
        pairs.into_iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Verify the session and the administrator wallet
pub(crate) fn authorize_admin(state: &AppState, req: &ApiRequest) -> Result<Claims> {
    let claims = authenticate(&req.headers, &state.jwt)?;
    require_admin(&claims, state.args.admin_wallet())?;
    Ok(claims)
}

/// Route a request to its handler
pub async fn dispatch(state: &AppState, req: ApiRequest) -> HttpResponse {
    let result = match (req.method.clone(), req.path.as_str()) {
        (Method::GET, "/health") | (Method::GET, "/healthz") => Ok(health_check(state)),
        (Method::GET, "/status") => Ok(status_check(state)),
        (Method::OPTIONS, _) => Ok(response::preflight_response()),

        (Method::GET, "/api/leaderboard") => leaderboard::get_leaderboard(state, &req).await,
        (Method::GET, p) if p.starts_with("/api/users/") => match user_stats_id(p) {
            Some(user_id) => profile::get_user_stats(state, user_id).await,
            None => Ok(response::not_found_response(p)),
        },

        (Method::GET, "/api/admin/rewards") => rewards::get_rewards(state, &req).await,
        (Method::GET, "/api/admin/airdrops") => rewards::list_airdrops(state, &req).await,
        (Method::POST, "/api/admin/airdrops") => rewards::create_airdrop(state, &req).await,
        (Method::POST, "/api/admin/revalidate") => rewards::revalidate(state, &req).await,

        _ => Ok(response::not_found_response(&req.path)),
    };

    match result {
        Ok(response) => response,
        Err(err) => {
            if err.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
                error!(method = %req.method, path = %req.path, "Request failed: {}", err);
            } else {
                debug!(method = %req.method, path = %req.path, "Request rejected: {}", err);
            }
            response::error_response(&err)
        }
    }
}

/// `{id}` from `/api/users/{id}/stats`
fn user_stats_id(path: &str) -> Option<&str> {
    path.strip_prefix("/api/users/")
        .and_then(|rest| rest.strip_suffix("/stats"))
        .filter(|id| !id.is_empty() && !id.contains('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_stats_id() {
        assert_eq!(user_stats_id("/api/users/abc123/stats"), Some("abc123"));
        assert_eq!(user_stats_id("/api/users//stats"), None);
        assert_eq!(user_stats_id("/api/users/a/b/stats"), None);
        assert_eq!(user_stats_id("/api/users/abc123"), None);
    }

    #[test]
    fn test_api_request_query() {
        let req = ApiRequest::get("/api/admin/rewards?format=csv&x=%20y");
        assert_eq!(req.path, "/api/admin/rewards");
        assert_eq!(req.query_param("format").as_deref(), Some("csv"));
        assert_eq!(req.query_param("x").as_deref(), Some(" y"));
        assert_eq!(req.query_param("missing"), None);
        assert_eq!(ApiRequest::get("/health").query, None);
    }
}
