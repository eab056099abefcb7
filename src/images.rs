//! Product image lookup with a 24h read-through cache.
//! Images are static mock URLs chosen by brand; the cache keeps repeated
//! product cards from re-resolving the same name.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::store::DurableStore;
use crate::cache::TimeBoxedCache;
use crate::metrics::{metric_names, MetricsRegistry};

const PHONE_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1592750475338-74b7b21085ab?w=400&h=400&fit=crop";

/// Brand → image URL. Checked in order by substring of the lowercased name.
pub const BRAND_IMAGES: &[(&str, &str)] = &[
    ("samsung", PHONE_IMAGE_URL),
    ("xiaomi", PHONE_IMAGE_URL),
    ("redmi", PHONE_IMAGE_URL),
    ("oneplus", PHONE_IMAGE_URL),
    ("realme", PHONE_IMAGE_URL),
    ("oppo", PHONE_IMAGE_URL),
    ("vivo", PHONE_IMAGE_URL),
];

pub const DEFAULT_IMAGE_URL: &str = PHONE_IMAGE_URL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Mock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImageResult {
    pub image_url: String,
    pub source: ImageSource,
    /// Unix ms at which the result was produced.
    pub timestamp: i64,
}

/// Pick the image for a product name by brand.
pub fn mock_image_for(product_name: &str) -> &'static str {
    let name = product_name.to_lowercase();
    BRAND_IMAGES
        .iter()
        .find(|(brand, _)| name.contains(brand))
        .map(|(_, url)| *url)
        .unwrap_or(DEFAULT_IMAGE_URL)
}

pub struct ProductImageService<S, C = SystemClock> {
    cache: TimeBoxedCache<S, Arc<C>>,
    clock: Arc<C>,
    metrics: Arc<MetricsRegistry>,
}

impl<S: DurableStore> ProductImageService<S, SystemClock> {
    pub fn new(store: S, metrics: Arc<MetricsRegistry>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), metrics)
    }
}

impl<S: DurableStore, C: Clock> ProductImageService<S, C> {
    pub fn with_clock(store: S, clock: Arc<C>, metrics: Arc<MetricsRegistry>) -> Self {
        Self::from_cache(
            TimeBoxedCache::with_clock(store, Arc::clone(&clock)),
            clock,
            metrics,
        )
    }

    /// Wrap an already configured cache (custom namespace or TTL).
    pub fn from_cache(
        cache: TimeBoxedCache<S, Arc<C>>,
        clock: Arc<C>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            cache,
            clock,
            metrics,
        }
    }

    pub fn cache(&self) -> &TimeBoxedCache<S, Arc<C>> {
        &self.cache
    }

    /// Image for a product. Served from cache when fresh. Never fails.
    pub fn get_product_image(&self, product_name: &str) -> ProductImageResult {
        let span = self.metrics.span(metric_names::IMAGE_RESOLVE);
        let mut resolved = false;
        let image_url = self.cache.get_or_resolve(product_name, |name| {
            resolved = true;
            mock_image_for(name).to_string()
        });
        span.finish();

        if resolved {
            self.metrics.increment(metric_names::IMAGE_CACHE_MISS);
            debug!(product = product_name, "image resolved");
        } else {
            self.metrics.increment(metric_names::IMAGE_CACHE_HIT);
        }

        ProductImageResult {
            image_url,
            source: ImageSource::Mock,
            timestamp: self.clock.now_ms(),
        }
    }

    /// Resolve and cache images ahead of rendering.
    pub fn preload_images<I, T>(&self, product_names: I) -> Vec<ProductImageResult>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        product_names
            .into_iter()
            .map(|name| self.get_product_image(name.as_ref()))
            .collect()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
