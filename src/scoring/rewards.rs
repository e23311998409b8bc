//! Reward distribution
//!
//! Splits a treasury balance across the leaderboard in proportion to
//! points. Amounts are truncated to two decimals so the sum of payouts can
//! never exceed the balance. Amounts below [`MIN_PAYOUT`] are dust: they
//! stay in the admin listing but are left out of the payout export.
//!
//! Once an administrator has executed a payout on-chain, the table that was
//! actually paid is recorded as an [`AirdropSnapshot`]. Snapshots are never
//! recomputed or edited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::leaderboard::LeaderboardEntry;
use crate::types::{Result, RewardsError};

/// Smallest amount worth paying out
pub const MIN_PAYOUT: f64 = 1.0;

/// CSV header for payout exports
pub const CSV_HEADER: &str = "Address,Amount";

/// One user's share of the treasury
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardShare {
    pub user_id: String,
    pub wallet_address: String,
    pub points: u64,
    pub share: f64,
    pub amount: f64,
}

impl RewardShare {
    pub fn is_dust(&self) -> bool {
        self.amount < MIN_PAYOUT
    }
}

/// Shares for every ranked user
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardDistribution {
    pub total_points: u64,
    pub shares: Vec<RewardShare>,
}

impl RewardDistribution {
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Shares large enough to pay out
    pub fn payable(&self) -> impl Iterator<Item = &RewardShare> {
        self.shares.iter().filter(|s| !s.is_dust())
    }

    /// Sum of all computed amounts
    pub fn total_amount(&self) -> f64 {
        self.shares.iter().map(|s| s.amount).sum()
    }

    /// Payout table as `Address,Amount` CSV, dust excluded
    pub fn to_csv(&self) -> String {
        std::iter::once(CSV_HEADER.to_string())
            .chain(
                self.payable()
                    .map(|s| format!("{},{}", s.wallet_address, s.amount)),
            )
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Truncate (never round up) to two decimals
pub fn truncate_cents(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

/// Split `balance` across `entries` in proportion to their points
///
/// Entries with zero points are skipped. A zero point total yields an empty
/// distribution. A negative or non-finite balance is treated as zero.
pub fn distribute(entries: &[LeaderboardEntry], balance: f64) -> RewardDistribution {
    let balance = if balance.is_finite() { balance.max(0.0) } else { 0.0 };
    let total_points: u64 = entries.iter().map(|e| e.points).sum();

    if total_points == 0 {
        return RewardDistribution::default();
    }

    let shares = entries
        .iter()
        .filter(|e| e.points > 0)
        .map(|e| {
            let share = e.points as f64 / total_points as f64;
            RewardShare {
                user_id: e.user_id.clone(),
                wallet_address: e.wallet_address.clone(),
                points: e.points,
                share,
                amount: truncate_cents(balance * share),
            }
        })
        .collect();

    RewardDistribution {
        total_points,
        shares,
    }
}

/// Output format for the rewards view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    /// Parse a `format` query value; anything but `csv` means JSON
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

/// Persisted record of an executed distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropSnapshot {
    pub id: String,
    pub tx_hash: String,
    pub total_amount: f64,
    pub editor_count: u64,
    /// The exact payout table, as submitted
    pub snapshot_json: String,
    pub created_at: DateTime<Utc>,
}

/// A confirmed distribution waiting to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewAirdrop {
    pub tx_hash: String,
    pub total_amount: f64,
    pub snapshot: Vec<Value>,
}

impl NewAirdrop {
    /// Validate a confirmation body `{ txHash, totalXrd, snapshot }`
    ///
    /// `totalAmount` is accepted in place of `totalXrd`.
    pub fn from_body(body: &Value) -> Result<Self> {
        let tx_hash = body.get("txHash").and_then(Value::as_str).map(str::trim);
        let total_amount = body
            .get("totalXrd")
            .or_else(|| body.get("totalAmount"))
            .and_then(Value::as_f64);
        let snapshot = body.get("snapshot").and_then(Value::as_array);

        match (tx_hash, total_amount, snapshot) {
            (Some(tx_hash), Some(total_amount), Some(snapshot))
                if !tx_hash.is_empty() && total_amount.is_finite() =>
            {
                Ok(Self {
                    tx_hash: tx_hash.to_string(),
                    total_amount,
                    snapshot: snapshot.clone(),
                })
            }
            _ => Err(RewardsError::BadRequest(
                "txHash, totalXrd and snapshot are required".into(),
            )),
        }
    }

    pub fn editor_count(&self) -> u64 {
        self.snapshot.len() as u64
    }

    /// Serialized payout table
    pub fn snapshot_json(&self) -> String {
        Value::Array(self.snapshot.clone()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: &str, points: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            user_id: id.to_string(),
            display_name: None,
            wallet_address: format!("account_rdx_{}", id),
            points,
        }
    }

    #[test]
    fn test_three_user_scenario() {
        let entries = vec![entry("a", 870), entry("b", 300), entry("c", 0)];
        let dist = distribute(&entries, 100.0);

        assert_eq!(dist.total_points, 1170);
        assert_eq!(dist.shares.len(), 2);
        assert!((dist.shares[0].share - 870.0 / 1170.0).abs() < 1e-12);
        assert_eq!(dist.shares[0].amount, 74.35);
        assert_eq!(dist.shares[1].amount, 25.64);

        let csv = dist.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Address,Amount");
        assert_eq!(lines[1], "account_rdx_a,74.35");
        assert_eq!(lines[2], "account_rdx_b,25.64");
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_shares_sum_to_one() {
        let entries: Vec<LeaderboardEntry> = (1..=37)
            .map(|i| entry(&format!("u{}", i), i * 13 + 7))
            .collect();
        let dist = distribute(&entries, 12_345.678);

        let sum: f64 = dist.shares.iter().map(|s| s.share).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(dist.total_amount() <= 12_345.678);
    }

    #[test]
    fn test_zero_points_yields_empty() {
        let dist = distribute(&[entry("a", 0), entry("b", 0)], 500.0);
        assert!(dist.is_empty());
        assert_eq!(dist.total_points, 0);
        assert_eq!(dist.to_csv(), "Address,Amount");

        assert!(distribute(&[], 500.0).is_empty());
    }

    #[test]
    fn test_dust_kept_in_listing_but_not_csv() {
        let dist = distribute(&[entry("whale", 999), entry("minnow", 1)], 100.0);
        assert_eq!(dist.shares.len(), 2);
        assert_eq!(dist.shares[1].amount, 0.1);
        assert!(dist.shares[1].is_dust());
        assert_eq!(dist.payable().count(), 1);
        assert_eq!(dist.to_csv().lines().count(), 2);
    }

    #[test]
    fn test_amounts_truncate_not_round() {
        assert_eq!(truncate_cents(33.339), 33.33);
        assert_eq!(truncate_cents(0.999), 0.99);
        let dist = distribute(&[entry("a", 1), entry("b", 1), entry("c", 1)], 100.0);
        assert!(dist.shares.iter().all(|s| s.amount == 33.33));
    }

    #[test]
    fn test_bad_balance_treated_as_zero() {
        let dist = distribute(&[entry("a", 10)], f64::NAN);
        assert_eq!(dist.shares[0].amount, 0.0);
        let dist = distribute(&[entry("a", 10)], -50.0);
        assert_eq!(dist.shares[0].amount, 0.0);
    }

    #[test]
    fn test_whole_amounts_format_without_decimals() {
        let dist = distribute(&[entry("a", 1), entry("b", 3)], 100.0);
        assert_eq!(dist.to_csv(), "Address,Amount\naccount_rdx_a,25\naccount_rdx_b,75");
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!(ExportFormat::parse(Some("csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse(Some("CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse(Some("json")), ExportFormat::Json);
        assert_eq!(ExportFormat::parse(None), ExportFormat::Json);
    }

    #[test]
    fn test_new_airdrop_validation() {
        let body = json!({
            "txHash": "txid_rdx1abc",
            "totalXrd": 99.99,
            "snapshot": [{"address": "account_rdx_a", "amount": 74.35}],
        });
        let airdrop = NewAirdrop::from_body(&body).unwrap();
        assert_eq!(airdrop.tx_hash, "txid_rdx1abc");
        assert_eq!(airdrop.total_amount, 99.99);
        assert_eq!(airdrop.editor_count(), 1);
        assert_eq!(
            airdrop.snapshot_json(),
            r#"[{"address":"account_rdx_a","amount":74.35}]"#
        );

        let alias = json!({"txHash": "tx", "totalAmount": 5, "snapshot": []});
        assert_eq!(NewAirdrop::from_body(&alias).unwrap().total_amount, 5.0);

        for bad in [
            json!({"totalXrd": 1, "snapshot": []}),
            json!({"txHash": "", "totalXrd": 1, "snapshot": []}),
            json!({"txHash": "tx", "snapshot": []}),
            json!({"txHash": "tx", "totalXrd": "1", "snapshot": []}),
            json!({"txHash": "tx", "totalXrd": 1}),
            json!({"txHash": "tx", "totalXrd": 1, "snapshot": {}}),
        ] {
            assert!(matches!(
                NewAirdrop::from_body(&bad),
                Err(RewardsError::BadRequest(_))
            ));
        }
    }
}
