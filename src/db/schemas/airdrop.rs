//! Airdrop snapshot documents
//!
//! Insert-only. A snapshot records exactly what was paid on-chain and is
//! never updated afterwards.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::scoring::{AirdropSnapshot, NewAirdrop};

pub const AIRDROP_COLLECTION: &str = "airdrops";

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AirdropDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Ledger transaction that executed the payout
    pub tx_hash: String,

    pub total_amount: f64,

    pub editor_count: i64,

    /// Payout table exactly as submitted
    pub snapshot_json: String,
}

impl AirdropDoc {
    pub fn new(airdrop: &NewAirdrop) -> Self {
        Self {
            _id: None,
            metadata: Metadata::at(DateTime::now()),
            tx_hash: airdrop.tx_hash.clone(),
            total_amount: airdrop.total_amount,
            editor_count: airdrop.editor_count() as i64,
            snapshot_json: airdrop.snapshot_json(),
        }
    }

    pub fn into_snapshot(self) -> AirdropSnapshot {
        AirdropSnapshot {
            id: self._id.map(|id| id.to_hex()).unwrap_or_default(),
            tx_hash: self.tx_hash,
            total_amount: self.total_amount,
            editor_count: self.editor_count.max(0) as u64,
            snapshot_json: self.snapshot_json,
            created_at: self
                .metadata
                .created_at
                .unwrap_or(DateTime::MIN)
                .to_chrono(),
        }
    }
}

impl IntoIndexes for AirdropDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "tx_hash": 1 },
                Some(
                    IndexOptions::builder()
                        .name("tx_hash_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("created_at_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for AirdropDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
