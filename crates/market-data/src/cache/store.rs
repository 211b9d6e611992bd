//! Cache storage backends.
//!
//! - [`MemoryCacheStore`]: process-local map
//! - [`DiskCacheStore`]: one JSON document per key, written atomically

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::RwLock;

use super::entry::{CacheEntry, CacheKey};
use crate::errors::MarketDataError;

/// Storage for cache entries.
///
/// Readers always receive owned copies; entries are replaced whole.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, MarketDataError>;

    /// Insert or replace the entry for `entry.key`.
    async fn put(&self, entry: CacheEntry) -> Result<(), MarketDataError>;

    async fn remove(&self, key: &CacheKey) -> Result<(), MarketDataError>;
}

/// Thread-safe in-memory cache store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStore {
    inner: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, MarketDataError> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), MarketDataError> {
        self.inner.write().await.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), MarketDataError> {
        self.inner.write().await.remove(key);
        Ok(())
    }
}

/// Disk-backed cache store.
///
/// Layout: `{root}/{period}/{security}.json`. Writes go to a `.tmp` file
/// which is renamed into place. Unreadable files are quarantined and
/// reported as misses.
#[derive(Debug, Clone)]
pub struct DiskCacheStore {
    root: PathBuf,
}

impl DiskCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root
            .join(key.period.as_str())
            .join(format!("{}.json", key.security))
    }
}

fn read_entry(path: &Path) -> Result<Option<CacheEntry>, MarketDataError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    match serde_json::from_slice::<CacheEntry>(&bytes) {
        Ok(entry) => Ok(Some(entry)),
        Err(err) => {
            let quarantine = path.with_extension("json.corrupt");
            warn!(
                "Corrupt cache file {}, moving to {}: {}",
                path.display(),
                quarantine.display(),
                err
            );
            let _ = fs::rename(path, &quarantine);
            Ok(None)
        }
    }
}

fn write_entry(path: &Path, entry: &CacheEntry) -> Result<(), MarketDataError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, serde_json::to_vec(entry)?)?;
    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        MarketDataError::Cache(format!("atomic rename failed: {}", err))
    })
}

async fn blocking<T, F>(f: F) -> Result<T, MarketDataError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, MarketDataError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| MarketDataError::Cache(format!("cache I/O task failed: {}", err)))?
}

#[async_trait]
impl CacheStore for DiskCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, MarketDataError> {
        let path = self.entry_path(key);
        blocking(move || read_entry(&path)).await
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), MarketDataError> {
        let path = self.entry_path(&entry.key);
        debug!("Writing cache entry {} to {}", entry.key, path.display());
        blocking(move || write_entry(&path, &entry)).await
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), MarketDataError> {
        let path = self.entry_path(key);
        blocking(move || match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Exchange, Period, RawFrame, SecurityCode};
    use chrono::{NaiveDate, Utc};

    fn entry() -> CacheEntry {
        CacheEntry {
            key: CacheKey::new(SecurityCode::new("000001", Exchange::Shenzhen), Period::Daily),
            frame: RawFrame::empty()
                .with_int("time", vec![1_749_686_400_000])
                .with_float("close", vec![11.0]),
            covered_start: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            covered_end: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            last_refreshed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryCacheStore::new();
        let entry = entry();
        assert!(store.get(&entry.key).await.unwrap().is_none());
        store.put(entry.clone()).await.unwrap();
        assert_eq!(store.get(&entry.key).await.unwrap(), Some(entry.clone()));
        store.remove(&entry.key).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_disk_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCacheStore::new(dir.path());
        let entry = entry();

        assert!(store.get(&entry.key).await.unwrap().is_none());
        store.put(entry.clone()).await.unwrap();

        let path = dir.path().join("1d").join("000001.XSHE.json");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.get(&entry.key).await.unwrap(), Some(entry.clone()));

        store.remove(&entry.key).await.unwrap();
        assert!(store.get(&entry.key).await.unwrap().is_none());
        store.remove(&entry.key).await.unwrap();
    }

    #[tokio::test]
    async fn test_disk_store_quarantines_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCacheStore::new(dir.path());
        let entry = entry();
        let path = dir.path().join("1d").join("000001.XSHE.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{not json").unwrap();

        assert!(store.get(&entry.key).await.unwrap().is_none());
        assert!(!path.exists());
        assert!(path.with_extension("json.corrupt").exists());
    }
}
