//! Core value types shared by the client, the filter adapter and the engine.

use serde::{Deserialize, Serialize};

/// The canonical query state: which slice of which (filtered) collection.
///
/// Two queries with identical fields share a cache entry and a single
/// in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageQuery {
    pub offset: usize,
    pub limit: usize,
    pub search_term: String,
}

impl PageQuery {
    pub fn new(offset: usize, limit: usize, search_term: impl Into<String>) -> Self {
        Self {
            offset,
            limit,
            search_term: search_term.into(),
        }
    }

    /// 1-based page number for this offset and limit.
    pub fn current_page(&self) -> usize {
        current_page(self.offset, self.limit)
    }

    /// Whether this query goes through the client-side filter.
    pub fn is_search(&self) -> bool {
        !self.search_term.is_empty()
    }
}

/// `floor(offset / limit) + 1`. A zero limit is treated as a single page.
pub fn current_page(offset: usize, limit: usize) -> usize {
    if limit == 0 {
        return 1;
    }
    offset / limit + 1
}

/// One entry of the remote collection as the server lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    /// Display name
    pub name: String,
    /// Resource URL, `.../<collection>/<id>/`
    pub url: String,
}

impl RawItem {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A page as returned by the server (or synthesized by the filter adapter).
///
/// The cursors are presence flags only; their content is never followed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageEnvelope {
    pub total_count: usize,
    pub has_next_cursor: bool,
    pub has_previous_cursor: bool,
    pub items: Vec<RawItem>,
}

/// An item ready for display, with its identifier derived from the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub url: String,
}
