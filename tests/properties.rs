//! End-to-end behavior of suggestions, the time-boxed cache and the services
//! built on them.

use std::sync::Arc;
use std::time::Duration;

use labelogic::cache::sqlite_store::SqliteStore;
use labelogic::cache::store::{DurableStore, FileStore, MemoryStore, StoreError};
use labelogic::cache::{TimeBoxedCache, DEFAULT_NAMESPACE, DEFAULT_TTL};
use labelogic::config::{DiscoveryConfig, StoreBackend};
use labelogic::history::SearchHistory;
use labelogic::suggest::catalog::Catalog;
use labelogic::suggest::{score, suggest, SuggestionMatcher};
use labelogic::{Discovery, ManualClock};

/// Store whose writes always fail, like browser storage with quota exhausted.
struct FailingStore;

impl DurableStore for FailingStore {
    fn read(&self, _key: &str) -> Option<String> {
        None
    }

    fn write(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("storage disabled".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("storage disabled".into()))
    }
}

fn unrelated_terms() -> Vec<&'static str> {
    vec![
        "POCO F5",
        "Sony WF-1000XM4",
        "Titan Watch",
        "Fire-Boltt Phoenix",
        "OnePlus Nord CE 3",
        "Kitchen Appliances",
        "Men's Footwear",
        "Smartphones",
        "Noise ColorFit Pro 3",
        "Redmi Note 13 Pro",
        "Wireless Earbuds",
    ]
}

#[test]
fn queries_below_two_characters_are_ignored() {
    let catalog = Catalog::popular();
    for q in ["", "a", " b ", "   ", "s\t"] {
        assert!(suggest(q, catalog.terms()).is_empty(), "{q:?}");
    }
}

#[test]
fn substring_match_outranks_fuzzy_match() {
    // "watch" is inside "Titan Watch"; "Wtach Strap" only shares its letters.
    let catalog = ["Wtach Strap", "Titan Watch"];
    let got = suggest("watch", &catalog);
    assert_eq!(got, ["Titan Watch", "Wtach Strap"]);
    assert_eq!(score("watch", "Wtach Strap"), 1.0);
}

#[test]
fn never_more_than_six() {
    let catalog = Catalog::popular();
    for q in ["ar", "earbuds", "sm", "pro", "oneplus nord"] {
        assert!(suggest(q, catalog.terms()).len() <= 6, "{q:?}");
    }
}

#[test]
fn terms_sharing_no_characters_are_excluded() {
    let catalog = ["xyz", "Kurtas", "POCO F5"];
    let got = suggest("kurta", &catalog);
    assert_eq!(got, ["Kurtas"]);
}

#[test]
fn sari_finds_banarasi_silk_saree() {
    let mut catalog = unrelated_terms();
    catalog.push("Banarasi Silk Saree");
    let got = suggest("sari", &catalog);
    assert!(got.iter().any(|t| t == "Banarasi Silk Saree"), "{got:?}");
    assert_eq!(got[0], "Banarasi Silk Saree");
}

#[test]
fn matcher_with_popular_catalog_is_deterministic() {
    let matcher = SuggestionMatcher::default();
    let catalog = Catalog::popular();
    assert_eq!(
        matcher.suggest_from("samsung", &catalog),
        matcher.suggest_from("samsung", &catalog)
    );
    assert_eq!(matcher.suggest_from("samsung", &catalog)[0], "Samsung Galaxy S23 FE");
}

#[test]
fn cache_keys_ignore_case() {
    let cache = TimeBoxedCache::new(MemoryStore::new());
    cache.set("Samsung Galaxy", "url-A");
    assert_eq!(cache.get("samsung galaxy").as_deref(), Some("url-A"));
}

#[test]
fn cache_entries_expire_after_a_day() {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let cache = TimeBoxedCache::with_clock(MemoryStore::new(), Arc::clone(&clock));
    cache.set("Samsung Galaxy", "url-A");

    clock.advance(Duration::from_secs(23 * 3600));
    assert_eq!(cache.get("samsung galaxy").as_deref(), Some("url-A"));

    clock.advance(Duration::from_secs(3600 + 1));
    assert_eq!(cache.get("samsung galaxy"), None);
}

#[test]
fn write_failures_do_not_surface() {
    let cache = TimeBoxedCache::new(FailingStore);
    cache.set("Samsung Galaxy", "url-A");
    assert_eq!(cache.get("Samsung Galaxy"), None);
    cache.clear();
    assert_eq!(cache.get_or_resolve("Titan Watch", |_| "url-B".into()), "url-B");
}

#[test]
fn clear_empties_the_cache() {
    let cache = TimeBoxedCache::new(MemoryStore::new());
    cache.set("a", "1");
    cache.set("B", "2");
    cache.clear();
    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.get("b"), None);
}

#[test]
fn cache_survives_reopen_of_file_store() {
    let dir = tempfile::tempdir().unwrap();
    {
        let cache = TimeBoxedCache::new(FileStore::open(dir.path()).unwrap());
        cache.set("Realme Buds Air 3", "url");
    }
    let cache = TimeBoxedCache::new(FileStore::open(dir.path()).unwrap());
    assert_eq!(cache.get("realme buds air 3").as_deref(), Some("url"));
}

#[test]
fn cache_survives_reopen_of_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labelogic.db");
    {
        let cache = TimeBoxedCache::new(SqliteStore::open(&path).unwrap()).with_ttl(DEFAULT_TTL);
        cache.set("Allen Solly Kurta", "url");
    }
    let store = SqliteStore::open(&path).unwrap();
    assert!(store.read(DEFAULT_NAMESPACE).is_some());
    let cache = TimeBoxedCache::new(store);
    assert_eq!(cache.get("allen solly kurta").as_deref(), Some("url"));
}

#[test]
fn history_persists_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labelogic.db");
    {
        let history = SearchHistory::load(SqliteStore::open(&path).unwrap());
        history.record("Smartwatches");
        history.record("Sarees");
    }
    let history = SearchHistory::load(SqliteStore::open(&path).unwrap());
    let terms: Vec<String> = history.recent().into_iter().map(|i| i.term).collect();
    assert_eq!(terms, ["Sarees", "Smartwatches"]);
}

#[test]
fn discovery_over_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = DiscoveryConfig {
        store: StoreBackend::File(dir.path().to_path_buf()),
        ..DiscoveryConfig::default()
    };
    {
        let discovery = Discovery::from_config(&config).unwrap();
        discovery.product_image("Vivo V29");
        discovery.submit_search("vivo");
    }
    let discovery = Discovery::from_config(&config).unwrap();
    assert!(discovery.images().cache().get("vivo v29").is_some());
    assert_eq!(discovery.history().recent()[0].term, "vivo");
    assert_eq!(discovery.trending().len(), 5);
}

#[test]
fn any_well_formed_blob_reads_without_panicking() {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let cache = TimeBoxedCache::with_clock(Arc::new(MemoryStore::new()), Arc::clone(&clock));
    for written_at in [i64::MIN, -1, 0, 1_700_000_000_000, i64::MAX] {
        let blob = format!(r#"{{"k":{{"value":"v","writtenAt":{written_at}}}}}"#);
        cache.store().write(DEFAULT_NAMESPACE, &blob).unwrap();
        for now in [i64::MIN, 0, 1_700_000_000_000, i64::MAX] {
            clock.set(now);
            let _ = cache.get("k");
            let _ = cache.len();
        }
    }

    cache
        .store()
        .write(DEFAULT_NAMESPACE, r#"{"k":{"value":"v","writtenAt":-9223372036854775808}}"#)
        .unwrap();
    clock.set(1_700_000_000_000);
    assert_eq!(cache.get("k"), None);
}

#[test]
fn configured_ttl_sets_the_expiry_boundary() {
    let config =
        DiscoveryConfig::from_lookup(|var| (var == "LABELOGIC_CACHE_TTL_SECS").then(|| "60".to_string()))
            .unwrap();
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let cache =
        TimeBoxedCache::with_clock(MemoryStore::new(), Arc::clone(&clock)).with_ttl(config.cache_ttl);
    cache.set("POCO F5", "url");

    clock.advance(Duration::from_millis(59_999));
    assert_eq!(cache.get("poco f5").as_deref(), Some("url"));
    clock.advance(Duration::from_millis(1));
    assert_eq!(cache.get("poco f5"), None);
}

#[test]
fn maximal_configured_ttl_never_expires() {
    let config = DiscoveryConfig::from_lookup(|var| {
        (var == "LABELOGIC_CACHE_TTL_SECS").then(|| u64::MAX.to_string())
    })
    .unwrap();
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let cache =
        TimeBoxedCache::with_clock(MemoryStore::new(), Arc::clone(&clock)).with_ttl(config.cache_ttl);
    cache.set("POCO F5", "url");
    assert_eq!(cache.get("poco f5").as_deref(), Some("url"));

    clock.advance(Duration::from_secs(100 * 365 * 24 * 3600));
    assert_eq!(cache.get("poco f5").as_deref(), Some("url"));
}
