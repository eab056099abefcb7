//! Labelogic: product-discovery core for the search box and product cards.
//! Typo-tolerant query suggestions, a 24h durable image cache, and recent
//! search history, wired together by `Discovery`.

pub mod cache;
pub mod config;
pub mod history;
pub mod images;
pub mod metrics;
pub mod suggest;

use std::sync::Arc;

use tracing::info;

use cache::sqlite_store::SqliteStore;
use cache::store::{DurableStore, FileStore, MemoryStore, StoreError};
use cache::TimeBoxedCache;
use config::{ConfigError, DiscoveryConfig, StoreBackend};
use history::SearchHistory;
use images::{ProductImageResult, ProductImageService};
use metrics::{metric_names, MetricsRegistry};
use suggest::catalog::{Catalog, CatalogError};
use suggest::normalize::{Transliterator, TransliterationError};
use suggest::{MatcherConfig, SuggestionMatcher};

pub use cache::clock::{Clock, ManualClock, SystemClock};

/// Shared handle to whichever store backend is configured.
pub type SharedStore = Arc<dyn DurableStore>;

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Transliteration(#[from] TransliterationError),
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter; `LABELOGIC_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("labelogic=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let json = std::env::var("LABELOGIC_LOG_FORMAT").is_ok_and(|f| f == "json");
    // A subscriber may already be installed (tests, host application).
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Search-box and product-card services over one durable store.
pub struct Discovery {
    catalog: Catalog,
    matcher: SuggestionMatcher,
    images: ProductImageService<SharedStore>,
    history: SearchHistory<SharedStore>,
    metrics: Arc<MetricsRegistry>,
}

impl Discovery {
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        config.validate()?;

        let store: SharedStore = match &config.store {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::File(dir) => Arc::new(FileStore::open(dir)?),
            StoreBackend::Sqlite(path) => Arc::new(SqliteStore::open(path)?),
        };

        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load_from_file(path)?,
            None => Catalog::popular(),
        };

        let transliterator = match &config.transliteration_path {
            Some(path) => Transliterator::load_from_file(path)?,
            None => Transliterator::new(),
        };

        info!(
            terms = catalog.len(),
            rules = transliterator.rules().len(),
            store = ?config.store,
            "discovery initialized"
        );

        Ok(Self::assemble(
            store,
            catalog,
            SuggestionMatcher::new(transliterator, MatcherConfig::default()),
            config,
        ))
    }

    /// Built-in catalog and table over the given store.
    pub fn with_store(store: SharedStore) -> Self {
        Self::assemble(
            store,
            Catalog::popular(),
            SuggestionMatcher::default(),
            &DiscoveryConfig::default(),
        )
    }

    fn assemble(
        store: SharedStore,
        catalog: Catalog,
        matcher: SuggestionMatcher,
        config: &DiscoveryConfig,
    ) -> Self {
        let metrics = Arc::new(MetricsRegistry::new());
        let clock = Arc::new(SystemClock);
        let cache = TimeBoxedCache::with_clock(Arc::clone(&store), Arc::clone(&clock))
            .with_namespace(config.cache_namespace.clone())
            .with_ttl(config.cache_ttl);
        let images = ProductImageService::from_cache(cache, clock, Arc::clone(&metrics));
        let history = SearchHistory::load(store).with_metrics(Arc::clone(&metrics));
        Self {
            catalog,
            matcher,
            images,
            history,
            metrics,
        }
    }

    /// Suggestions for the current search-box input.
    pub fn suggest(&self, query: &str) -> Vec<String> {
        let span = self.metrics.span(metric_names::SUGGEST);
        let suggestions = self.matcher.suggest_from(query, &self.catalog);
        span.finish();
        suggestions
    }

    /// Record a submitted search. Returns the trimmed term, or None if blank.
    pub fn submit_search(&self, term: &str) -> Option<String> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }
        self.history.record(term);
        Some(term.to_string())
    }

    pub fn product_image(&self, product_name: &str) -> ProductImageResult {
        self.images.get_product_image(product_name)
    }

    pub fn trending(&self) -> &'static [&'static str] {
        suggest::catalog::trending_searches()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn images(&self) -> &ProductImageService<SharedStore> {
        &self.images
    }

    pub fn history(&self) -> &SearchHistory<SharedStore> {
        &self.history
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }
}
