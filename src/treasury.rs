//! Treasury balance oracle
//!
//! The reward pool lives in a ledger account. [`GatewayTreasury`] asks the
//! ledger gateway for that account's balance of the reward resource;
//! [`StaticTreasury`] returns a fixed balance for dev mode and tests.
//!
//! A failed lookup is always an error. A zero balance is only reported when
//! the gateway says the account holds none of the resource.

use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::types::{Result, RewardsError};

/// Reward pool address and current balance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreasuryBalance {
    pub address: String,
    pub balance: f64,
}

#[async_trait::async_trait]
pub trait TreasuryOracle: Send + Sync {
    async fn balance(&self) -> Result<TreasuryBalance>;
}

/// Balance lookups against a ledger gateway API
pub struct GatewayTreasury {
    gateway_url: String,
    address: String,
    resource_address: String,
    http_client: reqwest::Client,
}

impl GatewayTreasury {
    pub fn new(
        gateway_url: &str,
        address: &str,
        resource_address: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wiki-rewards/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RewardsError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            address: address.to_string(),
            resource_address: resource_address.to_string(),
            http_client,
        })
    }

    fn details_url(&self) -> String {
        format!("{}/state/entity/details", self.gateway_url)
    }
}

#[async_trait::async_trait]
impl TreasuryOracle for GatewayTreasury {
    async fn balance(&self) -> Result<TreasuryBalance> {
        let body = json!({
            "addresses": [self.address],
            "aggregation_level": "Global",
        });

        let response = self
            .http_client
            .post(self.details_url())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let details: Value = response.json().await?;
        let balance = parse_gateway_balance(&details, &self.resource_address)?;

        debug!(address = %self.address, balance, "Fetched treasury balance");

        Ok(TreasuryBalance {
            address: self.address.clone(),
            balance,
        })
    }
}

/// Extract the balance of `resource_address` from an entity details response
///
/// Expects `items[0].fungible_resources.items[]` entries carrying a
/// `resource_address` and a decimal-string `amount`.
pub fn parse_gateway_balance(details: &Value, resource_address: &str) -> Result<f64> {
    let malformed = |what: &str| RewardsError::Treasury(format!("Malformed gateway response: {}", what));

    let resources = details
        .pointer("/items/0/fungible_resources/items")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing fungible_resources"))?;

    let Some(entry) = resources
        .iter()
        .find(|r| r.get("resource_address").and_then(Value::as_str) == Some(resource_address))
    else {
        return Ok(0.0);
    };

    let amount = match entry.get("amount") {
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    };

    match amount {
        Some(a) if a.is_finite() && a >= 0.0 => Ok(a),
        _ => Err(malformed("invalid amount")),
    }
}

/// Fixed balance, for dev mode and tests
pub struct StaticTreasury {
    balance: TreasuryBalance,
}

impl StaticTreasury {
    pub fn new(address: impl Into<String>, balance: f64) -> Self {
        Self {
            balance: TreasuryBalance {
                address: address.into(),
                balance,
            },
        }
    }
}

#[async_trait::async_trait]
impl TreasuryOracle for StaticTreasury {
    async fn balance(&self) -> Result<TreasuryBalance> {
        Ok(self.balance.clone())
    }
}
