//! Write timestamps for documents owned by this service

use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Common metadata for owned documents
///
/// Owned documents are append-only, so there is no soft-delete state.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl Metadata {
    /// Metadata stamped with a single creation time
    pub fn at(created_at: DateTime) -> Self {
        Self {
            created_at: Some(created_at),
            updated_at: Some(created_at),
        }
    }
}
