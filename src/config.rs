//! Runtime configuration.
//! Defaults match the web client; `from_env` overrides them from
//! `LABELOGIC_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{DEFAULT_NAMESPACE, DEFAULT_TTL};
use crate::history::HISTORY_KEY;

/// Where durable state (image cache, search history) is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    /// Directory of one file per key.
    File(PathBuf),
    Sqlite(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub cache_ttl: Duration,
    pub cache_namespace: String,
    pub store: StoreBackend,
    /// JSON catalog file; the built-in popular catalog when unset.
    pub catalog_path: Option<PathBuf>,
    /// JSON substitution table; the built-in table when unset.
    pub transliteration_path: Option<PathBuf>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_TTL,
            cache_namespace: DEFAULT_NAMESPACE.to_string(),
            store: StoreBackend::Memory,
            catalog_path: None,
            transliteration_path: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl DiscoveryConfig {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("LABELOGIC_CACHE_TTL_SECS") {
            let secs: u64 = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    var: "LABELOGIC_CACHE_TTL_SECS",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
            config.cache_ttl = Duration::from_secs(secs);
        }

        if let Some(value) = lookup("LABELOGIC_CACHE_NAMESPACE") {
            config.cache_namespace = value;
        }

        if let Some(value) = lookup("LABELOGIC_STORE") {
            config.store = parse_store(&value)?;
        }

        config.catalog_path = lookup("LABELOGIC_CATALOG").map(PathBuf::from);
        config.transliteration_path = lookup("LABELOGIC_TRANSLITERATION").map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }

    /// The cache namespace shares the store with search history, so it must
    /// be non-blank and distinct from the history key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let reason = if self.cache_namespace.trim().is_empty() {
            "must not be empty"
        } else if self.cache_namespace == HISTORY_KEY {
            "collides with the search history key"
        } else {
            return Ok(());
        };
        Err(ConfigError::Invalid {
            var: "LABELOGIC_CACHE_NAMESPACE",
            value: self.cache_namespace.clone(),
            reason: reason.into(),
        })
    }
}

/// `memory`, `file:<dir>` or `sqlite:<path>`.
fn parse_store(value: &str) -> Result<StoreBackend, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        var: "LABELOGIC_STORE",
        value: value.to_string(),
        reason: reason.to_string(),
    };
    match value.split_once(':') {
        None if value == "memory" => Ok(StoreBackend::Memory),
        Some(("file", path)) if !path.is_empty() => Ok(StoreBackend::File(path.into())),
        Some(("sqlite", path)) if !path.is_empty() => Ok(StoreBackend::Sqlite(path.into())),
        Some(("file" | "sqlite", _)) => Err(invalid("missing path")),
        _ => Err(invalid("expected memory, file:<dir> or sqlite:<path>")),
    }
}
