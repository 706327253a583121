//! Client-side name filtering.
//!
//! The remote resource has no search endpoint, so a search fetches the
//! whole collection in one bulk request, filters it in memory by
//! case-insensitive substring match on the name, and re-derives offset/limit
//! pagination over the filtered sequence. The bulk collection is kept for
//! the session and refetched once it is older than the staleness window.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::item::derive_id;
use crate::remote::{PageSource, TransportError};
use crate::types::{PageEnvelope, RawItem};

/// Case-insensitive substring match using Unicode case folding.
fn contains_case_insensitive(haystack: &str, folded_needle: &str) -> bool {
    unicase::UniCase::new(haystack)
        .to_folded_case()
        .contains(folded_needle)
}

/// Filter `collection` by `term` and cut out the `[offset, offset + limit)`
/// window.
///
/// Order is preserved. Entries whose URL has no identifier are dropped so
/// that positions stay meaningful. `total_count` is the size of the filtered
/// sequence, and the cursors are synthesized from the window position.
pub fn filter_page(collection: &[RawItem], offset: usize, limit: usize, term: &str) -> PageEnvelope {
    let needle = unicase::UniCase::new(term).to_folded_case();

    let matches: Vec<&RawItem> = collection
        .iter()
        .filter(|item| match derive_id(&item.url) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(name = %item.name, "excluding item from search: {e}");
                false
            }
        })
        .filter(|item| contains_case_insensitive(&item.name, &needle))
        .collect();

    let total_count = matches.len();
    let items = matches
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    PageEnvelope {
        total_count,
        has_next_cursor: offset.saturating_add(limit) < total_count,
        has_previous_cursor: offset > 0,
        items,
    }
}

struct BulkSnapshot {
    fetched_at: Instant,
    items: Arc<Vec<RawItem>>,
}

/// Serves filtered pages on top of an unfiltered [`PageSource`].
pub struct FilterAdapter<S> {
    source: S,
    bulk_limit: usize,
    stale_time: Duration,
    bulk: Mutex<Option<BulkSnapshot>>,
}

impl<S: PageSource> FilterAdapter<S> {
    pub fn new(source: S, bulk_limit: usize, stale_time: Duration) -> Self {
        Self {
            source,
            bulk_limit,
            stale_time,
            bulk: Mutex::new(None),
        }
    }

    /// The unfiltered source this adapter wraps.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch one filtered page.
    ///
    /// A failed bulk retrieval is returned as-is; there is no partial
    /// fallback.
    pub async fn fetch_filtered_page(
        &self,
        offset: usize,
        limit: usize,
        term: &str,
    ) -> Result<PageEnvelope, TransportError> {
        let collection = self.collection().await?;
        Ok(filter_page(&collection, offset, limit, term))
    }

    /// Drop the memoized bulk collection so the next search refetches it.
    pub async fn invalidate(&self) {
        *self.bulk.lock().await = None;
    }

    /// The full collection, fetched at most once per staleness window.
    ///
    /// The lock is held across the fetch so concurrent searches share a
    /// single bulk request.
    async fn collection(&self) -> Result<Arc<Vec<RawItem>>, TransportError> {
        let mut bulk = self.bulk.lock().await;

        if let Some(snapshot) = bulk.as_ref()
            && snapshot.fetched_at.elapsed() < self.stale_time
        {
            tracing::debug!(items = snapshot.items.len(), "reusing bulk collection");
            return Ok(Arc::clone(&snapshot.items));
        }

        tracing::debug!(limit = self.bulk_limit, "fetching bulk collection");
        let envelope = self.source.fetch_page(0, self.bulk_limit).await?;
        let items = Arc::new(envelope.items);
        *bulk = Some(BulkSnapshot {
            fetched_at: Instant::now(),
            items: Arc::clone(&items),
        });
        Ok(items)
    }
}
