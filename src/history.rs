//! Recent search terms, newest first, persisted through a `DurableStore`.
//! At most 10 items; re-searching a term moves it to the front.
//! Storage failures are logged and never surface to the search box.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::store::DurableStore;
use crate::metrics::{metric_names, MetricsRegistry};

/// Storage key for the serialized history list.
pub const HISTORY_KEY: &str = "searchHistory";

pub const MAX_HISTORY: usize = 10;

/// A single submitted search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub term: String,
    pub timestamp: i64,
}

pub struct SearchHistory<S, C = SystemClock> {
    store: S,
    clock: C,
    items: Mutex<Vec<HistoryItem>>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl<S: DurableStore> SearchHistory<S, SystemClock> {
    pub fn load(store: S) -> Self {
        Self::load_with_clock(store, SystemClock)
    }
}

impl<S: DurableStore, C: Clock> SearchHistory<S, C> {
    /// Read persisted history. An unreadable blob starts an empty history.
    pub fn load_with_clock(store: S, clock: C) -> Self {
        let items = match store.read(HISTORY_KEY) {
            Some(blob) => serde_json::from_str::<Vec<HistoryItem>>(&blob).unwrap_or_else(|e| {
                error!(error = %e, "failed to parse search history");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Self {
            store,
            clock,
            items: Mutex::new(items),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Put `term` at the front. Blank terms are ignored.
    pub fn record(&self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }

        let mut items = self.items.lock();
        items.retain(|item| item.term != term);
        items.insert(
            0,
            HistoryItem {
                term: term.to_string(),
                timestamp: self.clock.now_ms(),
            },
        );
        items.truncate(MAX_HISTORY);
        self.persist(&items);

        if let Some(metrics) = &self.metrics {
            metrics.increment(metric_names::HISTORY_RECORDED);
        }
    }

    /// Items, newest first.
    pub fn recent(&self) -> Vec<HistoryItem> {
        self.items.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn clear(&self) {
        self.items.lock().clear();
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            warn!(error = %e, "search history clear failed");
        }
    }

    fn persist(&self, items: &[HistoryItem]) {
        let blob = match serde_json::to_string(items) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "search history serialize failed");
                return;
            }
        };
        if let Err(e) = self.store.write(HISTORY_KEY, &blob) {
            warn!(error = %e, "search history write failed");
        }
    }
}
