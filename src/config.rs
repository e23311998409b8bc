//! Configuration
//!
//! CLI arguments with environment variable fallbacks, loaded through clap.
//! `main` reads a `.env` file first so local setups can keep everything in
//! one place.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::JwtValidator;
use crate::cache::{CacheConfig, DEFAULT_LEADERBOARD_TTL_SECS};
use crate::types::Result;

/// Wiki contribution scoring and reward distribution service
#[derive(Parser, Debug, Clone)]
#[command(name = "wiki-rewards")]
#[command(about = "Contribution scoring and reward distribution for the wiki")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory fallbacks, dev JWT secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "wiki")]
    pub mongodb_db: String,

    /// JWT secret shared with the CMS (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Wallet address allowed to use the admin endpoints
    #[arg(long, env = "ADMIN_WALLET_ADDRESS")]
    pub admin_wallet_address: Option<String>,

    /// Seconds a computed leaderboard is served before recomputation
    #[arg(long, env = "LEADERBOARD_TTL_SECS", default_value_t = DEFAULT_LEADERBOARD_TTL_SECS)]
    pub leaderboard_ttl_secs: u64,

    /// Treasury configuration
    #[command(flatten)]
    pub treasury: TreasuryArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Outbound request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "10000")]
    pub request_timeout_ms: u64,
}

/// Reward pool configuration
#[derive(Parser, Debug, Clone)]
pub struct TreasuryArgs {
    /// Ledger gateway base URL
    #[arg(long, env = "TREASURY_GATEWAY_URL")]
    pub treasury_gateway_url: Option<String>,

    /// Ledger account holding the reward pool
    #[arg(long, env = "TREASURY_ADDRESS")]
    pub treasury_address: Option<String>,

    /// Resource the rewards are paid in
    #[arg(long, env = "TREASURY_RESOURCE_ADDRESS")]
    pub treasury_resource_address: Option<String>,

    /// Fixed balance used in dev mode when no gateway is configured
    #[arg(long, env = "TREASURY_STATIC_BALANCE", default_value = "0")]
    pub treasury_static_balance: f64,
}

impl TreasuryArgs {
    /// Gateway URL, account and resource, if all three are set
    pub fn gateway(&self) -> Option<(&str, &str, &str)> {
        match (
            self.treasury_gateway_url.as_deref(),
            self.treasury_address.as_deref(),
            self.treasury_resource_address.as_deref(),
        ) {
            (Some(url), Some(address), Some(resource)) => Some((url, address, resource)),
            _ => None,
        }
    }
}

impl Args {
    /// JWT validator for the configured secret, or the dev secret in dev mode
    pub fn jwt_validator(&self) -> Result<JwtValidator> {
        match (&self.jwt_secret, self.dev_mode) {
            (Some(secret), _) => JwtValidator::new(secret.clone(), self.jwt_expiry_seconds),
            (None, true) => Ok(JwtValidator::new_dev()),
            (None, false) => JwtValidator::new(String::new(), self.jwt_expiry_seconds),
        }
    }

    pub fn admin_wallet(&self) -> Option<&str> {
        self.admin_wallet_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::with_ttl_secs(self.leaderboard_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.dev_mode {
            if self.jwt_secret.is_none() {
                return Err("JWT_SECRET is required in production mode".to_string());
            }
            if self.treasury.gateway().is_none() {
                return Err(
                    "TREASURY_GATEWAY_URL, TREASURY_ADDRESS and TREASURY_RESOURCE_ADDRESS are required in production mode"
                        .to_string(),
                );
            }
        }

        if !self.treasury.treasury_static_balance.is_finite()
            || self.treasury.treasury_static_balance < 0.0
        {
            return Err("TREASURY_STATIC_BALANCE must be a non-negative number".to_string());
        }

        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }
}
