//! Pagination and search engine for paged catalogue APIs.
//!
//! Turns an offset/limit REST collection into a cache-aware, search-aware
//! view model:
//!
//! ```ignore
//! use catalogue::{Config, QueryEngine, SearchInput};
//!
//! let config = Config::load()?;
//! let engine = QueryEngine::from_config(&config)?;
//! let mut search = SearchInput::attach_with_config(&engine, &config);
//!
//! let mut views = engine.subscribe();
//! search.set("saur");
//! views.changed().await?;
//! let view = views.borrow().clone();
//! ```

pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod filter;
pub mod item;
pub mod remote;
pub mod search;
pub mod types;

#[cfg(test)]
mod test_guards;

pub use config::Config;
pub use debounce::Debouncer;
pub use engine::{EngineOptions, FetchStatus, QueryEngine, ViewModel};
pub use error::{CatalogueError, Result};
pub use filter::{FilterAdapter, filter_page};
pub use item::derive_id;
pub use remote::{PageSource, RemoteClient, RetryPolicy, TransportError};
pub use search::SearchInput;
pub use types::{Item, PageEnvelope, PageQuery, RawItem, current_page};
