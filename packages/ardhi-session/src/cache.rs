//! Directory cache
//!
//! Keeps one JSON-serialized directory snapshot under a named entry with a
//! one hour expiry, so repeated verification attempts don't refetch the
//! whole user list. The snapshot expires as a whole; there is no partial
//! invalidation and no size bound.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::types::{DirectorySnapshot, User};

/// Entry name the directory is stored under
pub const DEFAULT_ENTRY: &str = "users";

// =============================================================================
// Store trait
// =============================================================================

/// Named string entries with an explicit expiry, like browser cookies.
///
/// Entries past their expiry read as absent.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn read(&self, name: &str) -> Result<Option<String>, CacheError>;

    async fn write(
        &self,
        name: &str,
        value: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CacheError>;

    async fn remove(&self, name: &str) -> Result<(), CacheError>;
}

#[async_trait]
impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    async fn read(&self, name: &str) -> Result<Option<String>, CacheError> {
        (**self).read(name).await
    }

    async fn write(
        &self,
        name: &str,
        value: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        (**self).write(name, value, expires_at).await
    }

    async fn remove(&self, name: &str) -> Result<(), CacheError> {
        (**self).remove(name).await
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl StoredEntry {
    fn is_live(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-wide store. Clones share the same entries.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoredEntry>>>,
}

static SHARED_STORE: OnceLock<MemoryStore> = OnceLock::new();

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store shared by every flow in this process
    pub fn shared() -> Self {
        SHARED_STORE.get_or_init(MemoryStore::new).clone()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn read(&self, name: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(name)
            .filter(|entry| entry.is_live())
            .map(|entry| entry.value.clone()))
    }

    async fn write(
        &self,
        name: &str,
        value: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.insert(name.to_string(), StoredEntry { value, expires_at });
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.remove(name);
        Ok(())
    }
}

// =============================================================================
// File-backed store
// =============================================================================

/// One JSON file per entry under `dir`; survives process restarts.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl CacheStore for FileStore {
    async fn read(&self, name: &str) -> Result<Option<String>, CacheError> {
        let raw = match tokio::fs::read_to_string(self.path(name)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: StoredEntry = serde_json::from_str(&raw)?;
        if !entry.is_live() {
            self.remove(name).await?;
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    async fn write(
        &self,
        name: &str,
        value: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let raw = serde_json::to_string(&StoredEntry { value, expires_at })?;
        tokio::fs::write(self.path(name), raw).await?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), CacheError> {
        match tokio::fs::remove_file(self.path(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Directory cache
// =============================================================================

#[derive(Serialize, Deserialize)]
struct CachedDirectory {
    captured_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    users: Vec<User>,
}

/// Typed `get`/`put`/`invalidate` over a single named store entry.
pub struct DirectoryCache<S> {
    store: S,
    entry: String,
}

impl<S: CacheStore> DirectoryCache<S> {
    pub fn new(store: S) -> Self {
        Self::with_entry(store, DEFAULT_ENTRY)
    }

    pub fn with_entry(store: S, entry: impl Into<String>) -> Self {
        Self {
            store,
            entry: entry.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cached snapshot if present and unexpired, `None` on a miss.
    ///
    /// Expired or undecodable entries are dropped and reported as a miss.
    pub async fn get(&self) -> Result<Option<DirectorySnapshot>, CacheError> {
        let Some(raw) = self.store.read(&self.entry).await? else {
            debug!(entry = %self.entry, "Directory cache miss");
            return Ok(None);
        };

        let cached: CachedDirectory = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(entry = %self.entry, error = %e, "Dropping undecodable directory cache entry");
                self.invalidate().await?;
                return Ok(None);
            }
        };

        let snapshot = DirectorySnapshot::captured_at(cached.users, cached.captured_at);
        if !snapshot.is_fresh_at(Utc::now()) {
            debug!(entry = %self.entry, captured_at = %snapshot.capture_time(), "Directory cache entry expired");
            self.invalidate().await?;
            return Ok(None);
        }

        debug!(entry = %self.entry, users = snapshot.len(), "Directory cache hit");
        Ok(Some(snapshot))
    }

    /// Store `users` stamped with the current time.
    pub async fn put(&self, users: Vec<User>) -> Result<DirectorySnapshot, CacheError> {
        let snapshot = DirectorySnapshot::new(users);
        self.put_snapshot(&snapshot).await?;
        Ok(snapshot)
    }

    pub async fn put_snapshot(&self, snapshot: &DirectorySnapshot) -> Result<(), CacheError> {
        let cached = CachedDirectory {
            captured_at: snapshot.capture_time(),
            expires_at: snapshot.expires_at(),
            users: snapshot.users().to_vec(),
        };
        let raw = serde_json::to_string(&cached)?;
        self.store
            .write(&self.entry, raw, snapshot.expires_at())
            .await
    }

    pub async fn invalidate(&self) -> Result<(), CacheError> {
        self.store.remove(&self.entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use chrono::Duration;

    fn amina() -> User {
        User {
            name: "Amina".to_string(),
            phone_number: "255712345678".to_string(),
            role: Role::Buyer,
        }
    }

    #[tokio::test]
    async fn test_put_then_get_returns_snapshot() {
        let cache = DirectoryCache::new(MemoryStore::new());
        let stored = cache.put(vec![amina()]).await.unwrap();

        let cached = cache.get().await.unwrap().expect("cache hit");
        assert_eq!(cached, stored);
    }

    #[tokio::test]
    async fn test_snapshot_older_than_an_hour_is_a_miss() {
        let cache = DirectoryCache::new(MemoryStore::new());
        let stale = DirectorySnapshot::captured_at(vec![amina()], Utc::now() - Duration::minutes(61));
        cache.put_snapshot(&stale).await.unwrap();

        assert!(cache.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_within_an_hour_is_a_hit() {
        let cache = DirectoryCache::new(MemoryStore::new());
        let recent = DirectorySnapshot::captured_at(vec![amina()], Utc::now() - Duration::minutes(59));
        cache.put_snapshot(&recent).await.unwrap();

        assert!(cache.get().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        DirectoryCache::new(store.clone()).put(vec![amina()]).await.unwrap();

        let other = DirectoryCache::new(store);
        assert_eq!(other.get().await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_drops_entry() {
        let cache = DirectoryCache::new(MemoryStore::new());
        cache.put(vec![amina()]).await.unwrap();
        cache.invalidate().await.unwrap();

        assert!(cache.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss_and_removed() {
        let store = MemoryStore::new();
        store
            .write(DEFAULT_ENTRY, "not json".to_string(), Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let cache = DirectoryCache::new(store.clone());
        assert!(cache.get().await.unwrap().is_none());
        assert!(store.read(DEFAULT_ENTRY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        DirectoryCache::new(FileStore::new(dir.path()))
            .put(vec![amina()])
            .await
            .unwrap();

        let reopened = DirectoryCache::new(FileStore::new(dir.path()));
        let snapshot = reopened.get().await.unwrap().expect("persisted snapshot");
        assert_eq!(snapshot.users()[0].name, "Amina");
    }

    #[tokio::test]
    async fn test_file_store_drops_expired_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store
            .write("users", "[]".to_string(), Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        assert!(store.read("users").await.unwrap().is_none());
        assert!(!dir.path().join("users.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_remove_missing_entry_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::new(dir.path()).remove("users").await.unwrap();
    }
}
