//! Durable string-keyed storage backends for the cache and search history.
//! Mirrors browser local storage: whole-value reads and writes under a key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// Failure writing to or removing from a durable store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage quota exceeded: {needed} bytes > {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Durable key/value medium. Reads never fail: an unreadable key is absent.
pub trait DurableStore: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: DurableStore + ?Sized> DurableStore for std::sync::Arc<S> {
    fn read(&self, key: &str) -> Option<String> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

impl<S: DurableStore + ?Sized> DurableStore for Box<S> {
    fn read(&self, key: &str) -> Option<String> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-process store. Optionally enforces a per-value byte quota.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes larger than `quota_bytes` fail with `QuotaExceeded`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DurableStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota_bytes {
            if value.len() > quota {
                return Err(StoreError::QuotaExceeded {
                    needed: value.len(),
                    quota,
                });
            }
        }
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// One file per key inside a directory. File names are the blake3 hex of the key.
pub struct FileStore {
    dir: PathBuf,
    // Serializes write-then-rename per process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (or create) the store directory.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        info!(path = %dir.display(), "file store opened");
        Ok(Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let hash = blake3::hash(key.as_bytes());
        self.dir.join(format!("{}.json", hash.to_hex()))
    }
}

impl DurableStore for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(error = %e, key, "file store read failed");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        debug!(key, bytes = value.len(), "file store write");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_quota_rejects_large_values() {
        let store = MemoryStore::with_quota(8);
        assert!(store.write("k", "small").is_ok());
        let err = store.write("k", "much too large").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { quota: 8, .. }));
        assert_eq!(store.read("k").as_deref(), Some("small"));
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.write("labelogic_product_images", "{}").unwrap();
        }
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.read("labelogic_product_images").as_deref(), Some("{}"));
        assert_eq!(store.read("other"), None);
    }

    #[test]
    fn file_store_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.write("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.read("k"), None);
    }
}
