//! Pagination/query engine.
//!
//! The engine owns the canonical [`PageQuery`] (offset, limit, search term),
//! serves it from the session cache when possible and otherwise fetches it,
//! either directly from the [`PageSource`] or through the [`FilterAdapter`]
//! when a search term is set. Every state change is published as a
//! [`ViewModel`] on a watch channel.
//!
//! # Ordering
//!
//! Fetches are never cancelled. When a response arrives the engine compares
//! its query with the query that is current at that moment; a response for
//! anything else is cached but never applied, so the last query wins.

pub mod cache;
pub mod view;

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::config::Config;
use crate::error::{CatalogueError, Result};
use crate::filter::FilterAdapter;
use crate::remote::{PageSource, RemoteClient};
use crate::types::{PageEnvelope, PageQuery};

pub use cache::QueryCache;
pub use view::{FetchStatus, ViewModel};

/// Starting position of a new engine.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Offset of the first page shown (default: 0)
    pub initial_offset: usize,
    /// Page size; `None` uses `Config::default_limit`
    pub initial_limit: Option<usize>,
}

struct EngineState {
    query: PageQuery,
    status: FetchStatus,
    cache: QueryCache,
    in_flight: HashSet<PageQuery>,
}

/// A fetch the engine decided to start after a transition.
struct FetchJob {
    query: PageQuery,
    refresh_bulk: bool,
}

struct Inner<S> {
    adapter: FilterAdapter<S>,
    state: Mutex<EngineState>,
    view_tx: watch::Sender<ViewModel>,
}

/// Handle to a running engine. Cloning is cheap and shares state.
pub struct QueryEngine<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for QueryEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl QueryEngine<RemoteClient> {
    /// Build an engine backed by the HTTP client described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = RemoteClient::from_config(config)?;
        Self::new(client, config, EngineOptions::default())
    }
}

impl<S: PageSource + 'static> QueryEngine<S> {
    /// Create an engine and start loading its first page.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(source: S, config: &Config, options: EngineOptions) -> Result<Self> {
        config.validate()?;
        let limit = options.initial_limit.unwrap_or(config.default_limit);
        if limit == 0 {
            return Err(CatalogueError::InvalidPageSize(limit));
        }

        let query = PageQuery::new(options.initial_offset, limit, "");
        let status = FetchStatus::Loading;
        let (view_tx, _) = watch::channel(ViewModel::derive(&query, &status));

        let mut in_flight = HashSet::new();
        in_flight.insert(query.clone());

        let engine = Self {
            inner: Arc::new(Inner {
                adapter: FilterAdapter::new(source, config.bulk_limit, config.stale_time()),
                state: Mutex::new(EngineState {
                    query: query.clone(),
                    status,
                    cache: QueryCache::new(config.stale_time()),
                    in_flight,
                }),
                view_tx,
            }),
        };

        engine.spawn_fetch(FetchJob {
            query,
            refresh_bulk: false,
        });
        Ok(engine)
    }

    /// Snapshot of the current view model.
    pub fn view(&self) -> ViewModel {
        self.inner.view_tx.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.inner.view_tx.subscribe()
    }

    /// The currently applied query.
    pub fn query(&self) -> PageQuery {
        self.inner.state.lock().query.clone()
    }

    /// Advance one page. No-op unless the current page reports a next page.
    pub fn go_to_next_page(&self) -> bool {
        self.navigate(|state| {
            let has_next = matches!(&state.status, FetchStatus::Ready(env) if env.has_next_cursor);
            has_next.then(|| {
                let q = &state.query;
                PageQuery::new(q.offset + q.limit, q.limit, q.search_term.clone())
            })
        })
    }

    /// Go back one page. No-op unless the current page reports a previous
    /// page; never goes below offset 0.
    pub fn go_to_previous_page(&self) -> bool {
        self.navigate(|state| {
            let has_previous =
                matches!(&state.status, FetchStatus::Ready(env) if env.has_previous_cursor);
            has_previous.then(|| {
                let q = &state.query;
                PageQuery::new(
                    q.offset.saturating_sub(q.limit),
                    q.limit,
                    q.search_term.clone(),
                )
            })
        })
    }

    /// Change the page size and return to the first page.
    ///
    /// Returns whether the query changed: setting the current limit while
    /// already on the first page is not a change.
    pub fn set_limit(&self, limit: usize) -> Result<bool> {
        if limit == 0 {
            return Err(CatalogueError::InvalidPageSize(limit));
        }
        Ok(self.navigate(|state| {
            Some(PageQuery::new(0, limit, state.query.search_term.clone()))
        }))
    }

    /// Apply a settled search term and return to the first page.
    ///
    /// Setting the term that is already applied is not a change.
    pub fn set_search_term(&self, term: impl Into<String>) -> bool {
        let term = term.into();
        self.navigate(|state| {
            (state.query.search_term != term)
                .then(|| PageQuery::new(0, state.query.limit, term.clone()))
        })
    }

    /// Drop the cached page for the current query and fetch it again.
    ///
    /// For a search this also refetches the bulk collection. Does nothing
    /// if the current query is already being fetched.
    pub fn refresh(&self) {
        let job = {
            let mut state = self.inner.state.lock();
            let query = state.query.clone();
            state.cache.remove(&query);
            let job = self.transition(&mut state, query);
            self.publish(&state);
            job
        };

        if let Some(mut job) = job {
            job.refresh_bulk = job.query.is_search();
            self.spawn_fetch(job);
        }
    }

    /// Compute the next query from the current state and apply it.
    fn navigate(&self, next: impl FnOnce(&EngineState) -> Option<PageQuery>) -> bool {
        let job = {
            let mut state = self.inner.state.lock();
            let Some(query) = next(&state) else {
                return false;
            };
            if query == state.query {
                return false;
            }
            let job = self.transition(&mut state, query);
            self.publish(&state);
            job
        };

        if let Some(job) = job {
            self.spawn_fetch(job);
        }
        true
    }

    /// Make `query` current: serve it from the cache, or mark it loading and
    /// return the fetch to start (unless one is already in flight).
    fn transition(&self, state: &mut EngineState, query: PageQuery) -> Option<FetchJob> {
        state.query = query.clone();

        if let Some(envelope) = state.cache.get_fresh(&query) {
            tracing::debug!(?query, "cache hit");
            state.status = FetchStatus::Ready(envelope);
            return None;
        }

        state.status = FetchStatus::Loading;
        if !state.in_flight.insert(query.clone()) {
            tracing::debug!(?query, "fetch already in flight");
            return None;
        }

        tracing::debug!(?query, "cache miss");
        Some(FetchJob {
            query,
            refresh_bulk: false,
        })
    }

    fn publish(&self, state: &EngineState) {
        self.inner
            .view_tx
            .send_replace(ViewModel::derive(&state.query, &state.status));
    }

    fn spawn_fetch(&self, job: FetchJob) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = inner.fetch(&job).await;
            inner.complete(job.query, result);
        });
    }
}

impl<S: PageSource> Inner<S> {
    async fn fetch(&self, job: &FetchJob) -> Result<PageEnvelope> {
        let query = &job.query;
        let envelope = if query.is_search() {
            if job.refresh_bulk {
                self.adapter.invalidate().await;
            }
            self.adapter
                .fetch_filtered_page(query.offset, query.limit, &query.search_term)
                .await?
        } else {
            self.adapter
                .source()
                .fetch_page(query.offset, query.limit)
                .await?
        };
        Ok(envelope)
    }

    /// Record a finished fetch and apply it if its query is still current.
    fn complete(&self, query: PageQuery, result: Result<PageEnvelope>) {
        let mut state = self.state.lock();
        state.in_flight.remove(&query);

        let is_current =
            state.query == query && matches!(state.status, FetchStatus::Loading);

        let status = match result {
            Ok(envelope) => {
                let envelope = Arc::new(envelope);
                state.cache.insert(query.clone(), Arc::clone(&envelope));
                FetchStatus::Ready(envelope)
            }
            Err(error) => {
                if is_current {
                    tracing::debug!(?query, "fetch failed: {error}");
                }
                FetchStatus::Failed(Arc::new(error))
            }
        };

        if !is_current {
            tracing::debug!(?query, current = ?state.query, "discarding stale response");
            return;
        }

        state.status = status;
        self.view_tx
            .send_replace(ViewModel::derive(&state.query, &state.status));
    }
}
