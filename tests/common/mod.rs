#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use catalogue::{
    Config, EngineOptions, PageEnvelope, PageSource, QueryEngine, RawItem, TransportError,
    ViewModel,
};
use parking_lot::Mutex;

const NAMES: &[&str] = &[
    "bulbasaur",
    "ivysaur",
    "venusaur",
    "charmander",
    "charmeleon",
    "charizard",
    "squirtle",
    "wartortle",
    "blastoise",
    "caterpie",
    "metapod",
    "butterfree",
];

type DelayFn = Box<dyn Fn(usize, usize) -> Duration + Send + Sync>;

/// In-memory stand-in for the remote collection.
///
/// Behaves like the real list endpoint (count, next/previous presence,
/// offset/limit slicing), records every request, and can be scripted to
/// fail or to answer slowly.
pub struct MockSource {
    items: Vec<RawItem>,
    calls: Mutex<Vec<(usize, usize)>>,
    failures: Mutex<VecDeque<TransportError>>,
    delay: DelayFn,
}

impl MockSource {
    /// A collection of `total` entries; the first twelve carry real names.
    pub fn pokedex(total: usize) -> Self {
        let items = (1..=total)
            .map(|id| {
                let name = NAMES
                    .get(id - 1)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("pokemon-{id}"));
                RawItem::new(name, format!("https://pokeapi.co/api/v2/pokemon/{id}/"))
            })
            .collect();
        Self::from_items(items)
    }

    pub fn from_items(items: Vec<RawItem>) -> Self {
        Self {
            items,
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            delay: Box::new(|_, _| Duration::ZERO),
        }
    }

    /// Answer each request after `delay(offset, limit)`.
    pub fn with_delay(
        mut self,
        delay: impl Fn(usize, usize) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Box::new(delay);
        self
    }

    /// Make the next request fail with `error`.
    pub fn fail_next(&self, error: TransportError) {
        self.failures.lock().push_back(error);
    }

    pub fn calls(&self) -> Vec<(usize, usize)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl PageSource for MockSource {
    async fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PageEnvelope, TransportError> {
        self.calls.lock().push((offset, limit));
        let failure = self.failures.lock().pop_front();

        let delay = (self.delay)(offset, limit);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = failure {
            return Err(error);
        }

        let total = self.items.len();
        Ok(PageEnvelope {
            total_count: total,
            has_next_cursor: offset + limit < total,
            has_previous_cursor: offset > 0,
            items: self.items.iter().skip(offset).take(limit).cloned().collect(),
        })
    }
}

/// Engine over a shared mock source with the default configuration.
pub fn engine_with(
    source: &Arc<MockSource>,
    options: EngineOptions,
) -> QueryEngine<Arc<MockSource>> {
    QueryEngine::new(Arc::clone(source), &Config::default(), options)
        .expect("engine should start")
}

/// Wait until the engine is no longer loading and return that view.
pub async fn settle<S: PageSource + 'static>(engine: &QueryEngine<S>) -> ViewModel {
    let mut rx = engine.subscribe();
    let view = rx
        .wait_for(|view| !view.is_loading)
        .await
        .expect("engine dropped while loading")
        .clone();
    view
}

pub fn names(view: &ViewModel) -> Vec<&str> {
    view.items.iter().map(|item| item.name.as_str()).collect()
}
