//! Suggestion catalog: the fixed, ordered list of product names and
//! category labels that queries are matched against.

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Popular products, in display priority order.
pub const POPULAR_PRODUCTS: &[&str] = &[
    "boAt Airdopes 141",
    "Noise ColorFit Pro 3",
    "OnePlus Nord CE 3",
    "Samsung Galaxy S23 FE",
    "POCO F5",
    "Redmi Note 13 Pro",
    "Fire-Boltt Phoenix",
    "Realme Buds Air 3",
    "Sony WF-1000XM4",
    "Allen Solly Kurta",
    "Banarasi Silk Saree",
    "Titan Watch",
];

pub const POPULAR_CATEGORIES: &[&str] = &[
    "Wireless Earbuds",
    "Smartwatches",
    "Smartphones",
    "Sarees",
    "Kurtas",
    "Men's Footwear",
    "Kitchen Appliances",
];

/// Shown on an empty search box. Not matched against.
pub const TRENDING_SEARCHES: &[&str] = &[
    "Diwali sale offers",
    "Budget true wireless earbuds",
    "Best phone under 20000",
    "SmartWatch with calling",
    "AMOLED display phones",
];

/// On-disk catalog format.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    terms: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable ordered term list. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    terms: Arc<[String]>,
}

impl Catalog {
    pub fn new<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// Popular products followed by popular categories.
    pub fn popular() -> Self {
        Self::new(POPULAR_PRODUCTS.iter().chain(POPULAR_CATEGORIES).copied())
    }

    /// Load a catalog from a JSON file: `{ "terms": [ ... ] }`.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        Ok(Self::new(file.terms))
    }

    pub fn empty() -> Self {
        Self::new(Vec::<String>::new())
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::popular()
    }
}

impl AsRef<[String]> for Catalog {
    fn as_ref(&self) -> &[String] {
        &self.terms
    }
}

pub fn trending_searches() -> &'static [&'static str] {
    TRENDING_SEARCHES
}
