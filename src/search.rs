//! Search box coordination.
//!
//! [`SearchInput`] holds the raw text the user is typing, debounces it, and
//! forwards each settled term into a [`QueryEngine`]. Keystroke churn never
//! reaches the engine, so a search's bulk retrieval only starts once the
//! term has stopped changing.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::Config;
use crate::debounce::Debouncer;
use crate::engine::QueryEngine;
use crate::remote::PageSource;

/// Raw search text bound to an engine through a debouncer.
///
/// Dropping it cancels any pending term and stops forwarding.
pub struct SearchInput {
    raw: String,
    debouncer: Debouncer<String>,
    forward: JoinHandle<()>,
}

impl SearchInput {
    /// Bind a new, empty search input to `engine`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn attach<S: PageSource + 'static>(engine: &QueryEngine<S>, window: Duration) -> Self {
        let initial = engine.query().search_term;
        let debouncer = Debouncer::new(initial.clone(), window);

        let mut settled = debouncer.subscribe();
        let engine = engine.clone();
        let forward = tokio::spawn(async move {
            while settled.changed().await.is_ok() {
                let term = settled.borrow_and_update().clone();
                tracing::debug!(%term, "search term settled");
                engine.set_search_term(term);
            }
        });

        Self {
            raw: initial,
            debouncer,
            forward,
        }
    }

    /// Bind using the configured debounce window.
    pub fn attach_with_config<S: PageSource + 'static>(
        engine: &QueryEngine<S>,
        config: &Config,
    ) -> Self {
        Self::attach(engine, config.search_debounce())
    }

    /// Update the raw text, as on every keystroke.
    pub fn set(&mut self, text: impl Into<String>) {
        self.raw = text.into();
        self.debouncer.push(self.raw.clone());
    }

    /// Clear the search box. The empty term settles like any other.
    pub fn clear(&mut self) {
        self.set(String::new());
    }

    /// The text as typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The last term that settled and was handed to the engine.
    pub fn settled(&self) -> String {
        self.debouncer.settled()
    }
}

impl Drop for SearchInput {
    fn drop(&mut self) {
        self.forward.abort();
    }
}
