use std::collections::HashMap;
use std::time::Duration;

use domain::value_objects::usage::UsageSummary;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

/// Entries past this count trigger an expired-entry purge on insert.
const PURGE_THRESHOLD: usize = 1024;

/// Per-user, TTL-bounded memoization of usage summaries.
///
/// Constructor-injected rather than a module-level singleton so tests can
/// run against their own instance. The cache is process-local: under a
/// multi-process deployment each process holds an independent copy, so a
/// mutation applied through one process stays visible as stale data in the
/// others until the TTL expires. Admission control tolerates that window;
/// it must never exceed the configured TTL.
pub struct UsageCache {
    ttl: Duration,
    entries: RwLock<HashMap<Uuid, CachedSummary>>,
}

struct CachedSummary {
    summary: UsageSummary,
    expires_at: Instant,
}

impl UsageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, user_id: Uuid) -> Option<UsageSummary> {
        let entries = self.entries.read().await;
        let entry = entries.get(&user_id)?;

        if entry.expires_at <= Instant::now() {
            return None;
        }

        Some(entry.summary)
    }

    pub async fn insert(&self, user_id: Uuid, summary: UsageSummary) {
        let expires_at = Instant::now() + self.ttl;
        let mut entries = self.entries.write().await;

        if entries.len() >= PURGE_THRESHOLD {
            let now = Instant::now();
            entries.retain(|_, entry| entry.expires_at > now);
        }

        entries.insert(
            user_id,
            CachedSummary {
                summary,
                expires_at,
            },
        );
    }

    /// Idempotent: invalidating an absent key is a no-op.
    pub async fn invalidate(&self, user_id: Uuid) {
        self.entries.write().await.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::value_objects::{
        plans::PlanTier,
        usage::{ResourceCounts, UsageSummary},
    };

    fn sample_summary(snippets: i64) -> UsageSummary {
        UsageSummary::from_counts(
            PlanTier::Started,
            ResourceCounts {
                snippets,
                ..Default::default()
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn returns_cached_summary_within_ttl() {
        let cache = UsageCache::new(Duration::from_secs(5));
        let user_id = Uuid::new_v4();

        cache.insert(user_id, sample_summary(3)).await;
        tokio::time::advance(Duration::from_secs(4)).await;

        let hit = cache.get(user_id).await.expect("entry should still be live");
        assert_eq!(hit.snippets.current, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_entries_after_ttl() {
        let cache = UsageCache::new(Duration::from_secs(5));
        let user_id = Uuid::new_v4();

        cache.insert(user_id, sample_summary(3)).await;
        tokio::time::advance(Duration::from_secs(6)).await;

        assert!(cache.get(user_id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_removes_a_live_entry() {
        let cache = UsageCache::new(Duration::from_secs(5));
        let user_id = Uuid::new_v4();

        cache.insert(user_id, sample_summary(3)).await;
        cache.invalidate(user_id).await;

        assert!(cache.get(user_id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn invalidating_an_absent_key_is_a_noop() {
        let cache = UsageCache::new(Duration::from_secs(5));

        cache.invalidate(Uuid::new_v4()).await;
    }

    #[tokio::test(start_paused = true)]
    async fn insert_overwrites_a_previous_entry() {
        let cache = UsageCache::new(Duration::from_secs(5));
        let user_id = Uuid::new_v4();

        cache.insert(user_id, sample_summary(3)).await;
        cache.insert(user_id, sample_summary(4)).await;

        let hit = cache.get(user_id).await.unwrap();
        assert_eq!(hit.snippets.current, 4);
    }
}
