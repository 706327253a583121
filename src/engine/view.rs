//! The view model handed to the presentation layer.

use std::sync::Arc;

use crate::error::CatalogueError;
use crate::item::items_from_raw;
use crate::types::{Item, PageEnvelope, PageQuery};

/// Fetch state for the current query.
#[derive(Debug, Clone)]
pub enum FetchStatus {
    Loading,
    Ready(Arc<PageEnvelope>),
    Failed(Arc<CatalogueError>),
}

/// Everything needed to render the current page.
///
/// Recomputed on every state change; `current_page` always matches the
/// applied `offset` and `limit`.
#[derive(Debug, Clone)]
pub struct ViewModel {
    pub items: Vec<Item>,
    pub has_next: bool,
    pub has_previous: bool,
    pub total_count: usize,
    pub current_page: usize,
    pub offset: usize,
    pub limit: usize,
    pub search_term: String,
    pub is_loading: bool,
    pub error: Option<Arc<CatalogueError>>,
}

impl ViewModel {
    /// Derive the view model from the applied query and its fetch status.
    ///
    /// While loading or after a failure there is no data: no items, zero
    /// total, and both navigation affordances disabled.
    pub fn derive(query: &PageQuery, status: &FetchStatus) -> Self {
        let mut view = ViewModel {
            items: Vec::new(),
            has_next: false,
            has_previous: false,
            total_count: 0,
            current_page: query.current_page(),
            offset: query.offset,
            limit: query.limit,
            search_term: query.search_term.clone(),
            is_loading: false,
            error: None,
        };

        match status {
            FetchStatus::Loading => view.is_loading = true,
            FetchStatus::Failed(error) => view.error = Some(Arc::clone(error)),
            FetchStatus::Ready(envelope) => {
                view.items = items_from_raw(&envelope.items);
                view.has_next = envelope.has_next_cursor;
                view.has_previous = envelope.has_previous_cursor;
                view.total_count = envelope.total_count;
            }
        }

        view
    }
}
