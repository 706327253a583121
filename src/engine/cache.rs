//! In-memory query cache keyed by [`PageQuery`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::types::{PageEnvelope, PageQuery};

struct CacheEntry {
    envelope: Arc<PageEnvelope>,
    fetched_at: Instant,
}

/// Session cache of fetched pages.
///
/// An entry is fresh for `stale_time` after it was stored. Stale entries
/// are never served and are pruned on the next insert.
pub struct QueryCache {
    entries: HashMap<PageQuery, CacheEntry>,
    stale_time: Duration,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stale_time,
        }
    }

    /// The cached page for `query`, if it is still fresh.
    pub fn get_fresh(&self, query: &PageQuery) -> Option<Arc<PageEnvelope>> {
        self.entries
            .get(query)
            .filter(|entry| entry.fetched_at.elapsed() < self.stale_time)
            .map(|entry| Arc::clone(&entry.envelope))
    }

    pub fn insert(&mut self, query: PageQuery, envelope: Arc<PageEnvelope>) {
        let stale_time = self.stale_time;
        self.entries
            .retain(|_, entry| entry.fetched_at.elapsed() < stale_time);
        self.entries.insert(
            query,
            CacheEntry {
                envelope,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn remove(&mut self, query: &PageQuery) {
        self.entries.remove(query);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total_count: usize) -> Arc<PageEnvelope> {
        Arc::new(PageEnvelope {
            total_count,
            ..PageEnvelope::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_uses_structural_equality() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(PageQuery::new(0, 20, "saur"), page(3));

        let hit = cache.get_fresh(&PageQuery::new(0, 20, "saur".to_string()));
        assert_eq!(hit.unwrap().total_count, 3);
        assert!(cache.get_fresh(&PageQuery::new(0, 20, "")).is_none());
        assert!(cache.get_fresh(&PageQuery::new(20, 20, "saur")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_go_stale() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        let query = PageQuery::new(0, 20, "");
        cache.insert(query.clone(), page(1118));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get_fresh(&query).is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get_fresh(&query).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_prunes_stale_entries() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        cache.insert(PageQuery::new(0, 20, ""), page(1));
        cache.insert(PageQuery::new(20, 20, ""), page(1));
        assert_eq!(cache.len(), 2);

        tokio::time::advance(Duration::from_secs(61)).await;
        cache.insert(PageQuery::new(40, 20, ""), page(1));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove() {
        let mut cache = QueryCache::new(Duration::from_secs(60));
        let query = PageQuery::new(0, 20, "");
        cache.insert(query.clone(), page(1));
        cache.remove(&query);
        assert!(cache.is_empty());
    }
}
