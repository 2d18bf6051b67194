//! Per-class feed URL cache.

use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::logging::ActivityLog;
use crate::models::CacheEntry;
use crate::storage::KeyValueStore;

/// Persistent cache holding at most one feed URL per class.
///
/// Reads never fail: a missing or unreadable entry is a miss.
#[derive(Clone)]
pub struct UrlCache {
    store: Arc<dyn KeyValueStore>,
    log: ActivityLog,
}

impl UrlCache {
    pub fn new(store: Arc<dyn KeyValueStore>, log: ActivityLog) -> Self {
        Self { store, log }
    }

    /// Storage key for a class.
    fn key(class_id: &str) -> String {
        format!("url_cache_{class_id}.json")
    }

    async fn load(&self, class_id: &str) -> Result<Option<CacheEntry>> {
        match self.store.read_bytes(&Self::key(class_id)).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Cached entry for `class_id`, if any.
    pub async fn get(&self, class_id: &str) -> Option<CacheEntry> {
        match self.load(class_id).await {
            Ok(Some(entry)) => {
                self.log
                    .debug(&format!(
                        "Cache hit [{}]: {}",
                        class_id,
                        entry.age_label(Utc::now())
                    ))
                    .await;
                Some(entry)
            }
            Ok(None) => {
                self.log
                    .debug(&format!("No cache found for class {class_id}"))
                    .await;
                None
            }
            Err(e) => {
                self.log
                    .error(&format!("Cache read failed [{class_id}]: {e}"))
                    .await;
                None
            }
        }
    }

    /// Store `feed_url` for `class_id`, replacing any previous entry.
    pub async fn put(&self, class_id: &str, feed_url: &str) -> Result<()> {
        let entry = CacheEntry::new(class_id, feed_url);
        let bytes = serde_json::to_vec(&entry)?;
        self.store.write_bytes(&Self::key(class_id), &bytes).await?;

        self.log
            .info(&format!(
                "Cache saved [{}] at {}",
                class_id,
                entry.saved_at.format("%Y-%m-%d %H:%M:%S")
            ))
            .await;
        Ok(())
    }

    /// Drop the entry for `class_id`.
    pub async fn invalidate(&self, class_id: &str) -> Result<()> {
        self.store.remove(&Self::key(class_id)).await?;
        self.log
            .info(&format!("Cache invalidated [{class_id}]"))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    fn cache(tmp: &TempDir) -> (UrlCache, Arc<LocalStorage>) {
        let store = Arc::new(LocalStorage::new(tmp.path()));
        let log = ActivityLog::new(store.clone());
        (UrlCache::new(store.clone(), log), store)
    }

    #[tokio::test]
    async fn test_missing_entry_is_none() {
        let tmp = TempDir::new().unwrap();
        let (cache, _) = cache(&tmp);
        assert!(cache.get("1234").await.is_none());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let tmp = TempDir::new().unwrap();
        let (cache, _) = cache(&tmp);

        cache.put("1234", "https://ade.example/feed.ics").await.unwrap();
        let entry = cache.get("1234").await.unwrap();
        assert_eq!(entry.class_id, "1234");
        assert_eq!(entry.feed_url, "https://ade.example/feed.ics");
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let tmp = TempDir::new().unwrap();
        let (cache, _) = cache(&tmp);

        cache.put("1234", "https://old").await.unwrap();
        cache.put("1234", "https://new").await.unwrap();
        assert_eq!(cache.get("1234").await.unwrap().feed_url, "https://new");
    }

    #[tokio::test]
    async fn test_entries_are_per_class() {
        let tmp = TempDir::new().unwrap();
        let (cache, _) = cache(&tmp);

        cache.put("1", "https://one").await.unwrap();
        cache.put("2", "https://two").await.unwrap();
        cache.invalidate("1").await.unwrap();

        assert!(cache.get("1").await.is_none());
        assert_eq!(cache.get("2").await.unwrap().feed_url, "https://two");
    }

    #[tokio::test]
    async fn test_malformed_entry_is_logged_miss() {
        let tmp = TempDir::new().unwrap();
        let (cache, store) = cache(&tmp);

        store
            .write_bytes("url_cache_1234.json", b"{not json")
            .await
            .unwrap();

        assert!(cache.get("1234").await.is_none());
        let logs = cache.log.read_all().await;
        assert!(logs.contains("[ERROR] Cache read failed [1234]"));
    }
}
