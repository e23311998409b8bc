//! In-memory store
//!
//! Used when MongoDB is unavailable in dev mode, and by the test suites.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{ActivityStore, AirdropStore};
use crate::scoring::{
    ActivityBatch, AirdropSnapshot, AuthoredEvent, NewAirdrop, PageEvent, UserActivity, UserRef,
};
use crate::types::Result;

#[derive(Default)]
struct Tables {
    users: Vec<UserRef>,
    /// page_id -> author_id
    pages: HashMap<String, String>,
    revisions: Vec<AuthoredEvent>,
    comments: Vec<AuthoredEvent>,
    airdrops: Vec<AirdropSnapshot>,
}

/// Activity and airdrop storage held in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user
    pub async fn add_user(&self, user: UserRef) {
        let mut tables = self.tables.write().await;
        tables.users.retain(|u| u.user_id != user.user_id);
        tables.users.push(user);
    }

    /// Record a page and its original author
    pub async fn add_page(&self, page_id: &str, author_id: &str) {
        self.tables
            .write()
            .await
            .pages
            .insert(page_id.to_string(), author_id.to_string());
    }

    pub async fn add_revision(&self, author_id: &str, page_id: &str, at: DateTime<Utc>) {
        self.tables.write().await.revisions.push(AuthoredEvent {
            author_id: author_id.to_string(),
            page_id: page_id.to_string(),
            at,
        });
    }

    pub async fn add_comment(&self, author_id: &str, page_id: &str, at: DateTime<Utc>) {
        self.tables.write().await.comments.push(AuthoredEvent {
            author_id: author_id.to_string(),
            page_id: page_id.to_string(),
            at,
        });
    }
}

fn events_for(events: &[AuthoredEvent], user_id: &str) -> Vec<PageEvent> {
    events
        .iter()
        .filter(|e| e.author_id == user_id)
        .map(|e| PageEvent::new(e.page_id.clone(), e.at))
        .collect()
}

#[async_trait::async_trait]
impl ActivityStore for MemoryStore {
    async fn user_activity(&self, user_id: &str) -> Result<Option<UserActivity>> {
        let tables = self.tables.read().await;
        let Some(user) = tables.users.iter().find(|u| u.user_id == user_id) else {
            return Ok(None);
        };

        Ok(Some(UserActivity {
            user: user.clone(),
            pages_created: tables.pages.values().filter(|a| *a == user_id).count() as u64,
            revisions: events_for(&tables.revisions, user_id),
            comments: events_for(&tables.comments, user_id),
        }))
    }

    async fn activity_batch(&self) -> Result<ActivityBatch> {
        let tables = self.tables.read().await;

        let mut authored_pages: HashMap<String, u64> = HashMap::new();
        for author in tables.pages.values() {
            *authored_pages.entry(author.clone()).or_default() += 1;
        }

        Ok(ActivityBatch {
            users: tables.users.clone(),
            authored_pages,
            revisions: tables.revisions.clone(),
            comments: tables.comments.clone(),
        })
    }
}

#[async_trait::async_trait]
impl AirdropStore for MemoryStore {
    async fn list_airdrops(&self) -> Result<Vec<AirdropSnapshot>> {
        let mut airdrops = self.tables.read().await.airdrops.clone();
        // Insertion order breaks ties between equal timestamps
        airdrops.reverse();
        airdrops.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(airdrops)
    }

    async fn insert_airdrop(&self, airdrop: NewAirdrop) -> Result<AirdropSnapshot> {
        let snapshot = AirdropSnapshot {
            id: Uuid::new_v4().to_string(),
            editor_count: airdrop.editor_count(),
            snapshot_json: airdrop.snapshot_json(),
            tx_hash: airdrop.tx_hash,
            total_amount: airdrop.total_amount,
            created_at: Utc::now(),
        };

        self.tables.write().await.airdrops.push(snapshot.clone());
        debug!(id = %snapshot.id, tx_hash = %snapshot.tx_hash, "Recorded airdrop snapshot");
        Ok(snapshot)
    }
}
