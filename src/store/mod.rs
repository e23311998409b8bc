//! Storage adapters
//!
//! The engine reads a handful of fields from the CMS collections and writes
//! only airdrop snapshots. Both concerns sit behind traits so the server can
//! run against MongoDB in production and against [`MemoryStore`] in dev mode
//! and tests.

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use crate::scoring::{ActivityBatch, AirdropSnapshot, NewAirdrop, UserActivity};
use crate::types::Result;

/// Read access to user activity
#[async_trait::async_trait]
pub trait ActivityStore: Send + Sync {
    /// Raw activity for one user, or `None` if the user does not exist
    async fn user_activity(&self, user_id: &str) -> Result<Option<UserActivity>>;

    /// Raw activity for every user, read in one pass
    async fn activity_batch(&self) -> Result<ActivityBatch>;
}

/// Append-only airdrop history
#[async_trait::async_trait]
pub trait AirdropStore: Send + Sync {
    /// All recorded snapshots, newest first
    async fn list_airdrops(&self) -> Result<Vec<AirdropSnapshot>>;

    /// Persist a confirmed distribution as a new snapshot
    async fn insert_airdrop(&self, airdrop: NewAirdrop) -> Result<AirdropSnapshot>;
}
