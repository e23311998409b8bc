//! HTTP server implementation
//!
//! hyper http1 with TokioIo, one task per connection. Request bodies are
//! collected up front and handed to [`routes::dispatch`].

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::JwtValidator;
use crate::cache::LeaderboardCache;
use crate::config::Args;
use crate::routes::{self, ApiRequest};
use crate::store::{ActivityStore, AirdropStore, MemoryStore};
use crate::treasury::TreasuryOracle;
use crate::types::{Result, RewardsError};

/// Where activity and airdrops are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mongo => "mongodb",
            Self::Memory => "memory",
        }
    }
}

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub store: Arc<dyn ActivityStore>,
    pub airdrops: Arc<dyn AirdropStore>,
    pub treasury: Arc<dyn TreasuryOracle>,
    pub leaderboard: LeaderboardCache,
    pub jwt: JwtValidator,
    pub storage: StorageBackend,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        args: Args,
        store: Arc<dyn ActivityStore>,
        airdrops: Arc<dyn AirdropStore>,
        treasury: Arc<dyn TreasuryOracle>,
        storage: StorageBackend,
    ) -> Result<Self> {
        let jwt = args.jwt_validator()?;
        let leaderboard = LeaderboardCache::new(args.cache_config());

        Ok(Self {
            args,
            store,
            airdrops,
            treasury,
            leaderboard,
            jwt,
            storage,
            started_at: Instant::now(),
        })
    }

    /// State backed by a single in-memory store
    pub fn in_memory(
        args: Args,
        store: Arc<MemoryStore>,
        treasury: Arc<dyn TreasuryOracle>,
    ) -> Result<Self> {
        let airdrops: Arc<dyn AirdropStore> = store.clone();
        Self::new(args, store, airdrops, treasury, StorageBackend::Memory)
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "wiki-rewards listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - dev JWT secret and in-memory fallbacks allowed");
    }
    if state.args.admin_wallet().is_none() {
        warn!("ADMIN_WALLET_ADDRESS not set - admin endpoints will reject every request");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = hyper_util::rt::TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Collect the request and route it
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = req.into_parts();
    info!("[{}] {} {}", addr, parts.method, parts.uri.path());

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("[{}] Failed to read request body: {}", addr, e);
            return Ok(routes::response::error_response(&RewardsError::BadRequest(
                "Failed to read request body".into(),
            )));
        }
    };

    let request = ApiRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers,
        body,
    };

    Ok(routes::dispatch(&state, request).await)
}
