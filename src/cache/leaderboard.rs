//! Leaderboard cache
//!
//! Holds the most recent ranking. A snapshot is served while it is younger
//! than the TTL and no invalidation has happened since it was computed.
//! Refresh is single-flight: callers queue on one async mutex, so a burst
//! of requests after expiry triggers exactly one recomputation.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{CacheConfig, CacheStats};
use crate::scoring::{aggregate_batch, rank, LeaderboardEntry};
use crate::store::ActivityStore;
use crate::types::Result;

/// Invalidation tag for the leaderboard
pub const LEADERBOARD_TAG: &str = "leaderboard";

/// One computed ranking
#[derive(Debug, Clone)]
pub struct LeaderboardSnapshot {
    pub entries: Vec<LeaderboardEntry>,
    /// ETag for HTTP caching (SHA256 of the serialized ranking)
    pub etag: String,
    pub computed_at: DateTime<Utc>,
    generation: u64,
    created: Instant,
}

impl LeaderboardSnapshot {
    fn new(entries: Vec<LeaderboardEntry>, generation: u64) -> Result<Self> {
        let etag = compute_etag(&entries)?;
        Ok(Self {
            entries,
            etag,
            computed_at: Utc::now(),
            generation,
            created: Instant::now(),
        })
    }

    /// Check if this snapshot has outlived `ttl`
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created.elapsed() >= ttl
    }

    pub fn age_secs(&self) -> u64 {
        self.created.elapsed().as_secs()
    }
}

fn compute_etag(entries: &[LeaderboardEntry]) -> Result<String> {
    let data = serde_json::to_vec(entries)?;
    let hash = Sha256::digest(&data);
    Ok(format!("\"{}\"", hex::encode(&hash[..16])))
}

/// TTL cache over the full ranking
pub struct LeaderboardCache {
    config: CacheConfig,
    current: Mutex<Option<Arc<LeaderboardSnapshot>>>,
    /// Bumped on every invalidation
    generation: AtomicU64,
    /// Entry count of the last stored snapshot, readable without the lock
    entries: AtomicUsize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LeaderboardCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            current: Mutex::new(None),
            generation: AtomicU64::new(0),
            entries: AtomicUsize::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Current ranking, recomputed from `store` if stale
    pub async fn get_or_refresh(&self, store: &dyn ActivityStore) -> Result<Arc<LeaderboardSnapshot>> {
        let mut current = self.current.lock().await;
        let generation = self.generation.load(Ordering::Acquire);

        if let Some(snapshot) = current.as_ref() {
            if snapshot.generation == generation && !snapshot.is_expired(self.config.leaderboard_ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(age_secs = snapshot.age_secs(), "Leaderboard cache hit");
                return Ok(Arc::clone(snapshot));
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let batch = store.activity_batch().await?;
        let user_count = batch.users.len();
        let entries = rank(aggregate_batch(batch, Utc::now()));
        let snapshot = Arc::new(LeaderboardSnapshot::new(entries, generation)?);

        info!(
            users = user_count,
            ranked = snapshot.entries.len(),
            generation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Leaderboard recomputed"
        );

        self.entries.store(snapshot.entries.len(), Ordering::Relaxed);
        *current = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Force recomputation on the next access
    pub fn invalidate(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation, "Leaderboard invalidated");
    }

    /// Invalidate by tag; returns `false` for tags this cache does not own
    pub fn invalidate_tag(&self, tag: &str) -> bool {
        if tag != LEADERBOARD_TAG {
            debug!(tag, "Ignoring unknown cache tag");
            return false;
        }
        self.invalidate();
        true
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            generation: self.generation.load(Ordering::Relaxed),
            ttl_secs: self.config.leaderboard_ttl.as_secs(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.config.leaderboard_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{ActivityBatch, UserActivity, UserRef};
    use crate::store::MemoryStore;
    use crate::types::RewardsError;
    use chrono::Duration as ChronoDuration;

    /// Counts how often the batch query runs
    struct CountingStore {
        inner: MemoryStore,
        batches: AtomicU64,
    }

    #[async_trait::async_trait]
    impl ActivityStore for CountingStore {
        async fn user_activity(&self, user_id: &str) -> Result<Option<UserActivity>> {
            self.inner.user_activity(user_id).await
        }

        async fn activity_batch(&self) -> Result<ActivityBatch> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.inner.activity_batch().await
        }
    }

    async fn seeded() -> CountingStore {
        let inner = MemoryStore::new();
        for (id, pages) in [("alice", 2), ("bob", 1), ("carol", 0)] {
            inner
                .add_user(UserRef {
                    user_id: id.to_string(),
                    display_name: None,
                    wallet_address: format!("account_{}", id),
                    created_at: Utc::now() - ChronoDuration::days(1),
                })
                .await;
            for p in 0..pages {
                inner.add_page(&format!("{}-{}", id, p), id).await;
            }
        }
        CountingStore {
            inner,
            batches: AtomicU64::new(0),
        }
    }

    #[tokio::test]
    async fn test_ranking_is_cached_within_ttl() {
        let store = seeded().await;
        let cache = LeaderboardCache::with_defaults();

        let first = cache.get_or_refresh(&store).await.unwrap();
        let second = cache.get_or_refresh(&store).await.unwrap();

        assert_eq!(first.entries.len(), 2);
        assert_eq!(first.entries[0].user_id, "alice");
        assert_eq!(first.etag, second.etag);
        assert_eq!(store.batches.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 2);
    }

    #[tokio::test]
    async fn test_tag_invalidation_forces_refresh() {
        let store = seeded().await;
        let cache = LeaderboardCache::with_defaults();

        let before = cache.get_or_refresh(&store).await.unwrap();
        store.inner.add_page("bob-extra", "bob").await;
        store.inner.add_page("bob-extra-2", "bob").await;

        // Still cached
        let cached = cache.get_or_refresh(&store).await.unwrap();
        assert_eq!(cached.etag, before.etag);

        assert!(!cache.invalidate_tag("pages"));
        assert!(cache.invalidate_tag(LEADERBOARD_TAG));

        let after = cache.get_or_refresh(&store).await.unwrap();
        assert_ne!(after.etag, before.etag);
        assert_eq!(after.entries[0].user_id, "bob");
        assert_eq!(store.batches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_snapshot_is_recomputed() {
        let store = seeded().await;
        let cache = LeaderboardCache::new(CacheConfig::with_ttl_secs(0));

        cache.get_or_refresh(&store).await.unwrap();
        cache.get_or_refresh(&store).await.unwrap();
        assert_eq!(store.batches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_is_single_flight() {
        let store = Arc::new(seeded().await);
        let cache = Arc::new(LeaderboardCache::with_defaults());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get_or_refresh(store.as_ref()).await.map(|s| s.etag.clone()) })
            })
            .collect();

        let mut etags = Vec::new();
        for task in tasks {
            etags.push(task.await.unwrap().unwrap());
        }

        assert!(etags.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.batches.load(Ordering::SeqCst), 1);
    }

    /// Serves one good batch, then fails every query
    struct FlakyStore {
        inner: MemoryStore,
        fail: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl ActivityStore for FlakyStore {
        async fn user_activity(&self, user_id: &str) -> Result<Option<UserActivity>> {
            self.inner.user_activity(user_id).await
        }

        async fn activity_batch(&self) -> Result<ActivityBatch> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(RewardsError::Database("connection reset".into()));
            }
            self.inner.activity_batch().await
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_not_cached() {
        let store = FlakyStore {
            inner: seeded().await.inner,
            fail: std::sync::atomic::AtomicBool::new(true),
        };
        let cache = LeaderboardCache::with_defaults();

        let err = cache.get_or_refresh(&store).await.unwrap_err();
        assert!(matches!(err, RewardsError::Database(_)));
        assert_eq!(cache.stats().entries, 0);

        // The failed refresh left nothing behind; the next call recomputes
        store.fail.store(false, Ordering::SeqCst);
        let snapshot = cache.get_or_refresh(&store).await.unwrap();
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.stats().hits, 0);

        // A later failure after invalidation surfaces instead of an empty ranking
        store.fail.store(true, Ordering::SeqCst);
        cache.invalidate();
        assert!(cache.get_or_refresh(&store).await.is_err());
    }

    #[tokio::test]
    async fn test_stats_entries_readable_during_refresh() {
        let store = Arc::new(seeded().await);
        let cache = Arc::new(LeaderboardCache::with_defaults());
        cache.get_or_refresh(store.as_ref()).await.unwrap();
        cache.invalidate();

        let refresh = {
            let store = Arc::clone(&store);
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get_or_refresh(store.as_ref()).await.map(|_| ()) })
        };
        // The refresh sleeps inside the batch query while holding the lock
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.stats().entries, 2);

        refresh.await.unwrap().unwrap();
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn test_etag_format() {
        let etag = compute_etag(&[]).unwrap();
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag.len(), 34);
    }
}
