//! Storage abstractions for resolver state.
//!
//! Everything the resolver persists is a small blob under a fixed key:
//!
//! ```text
//! storage/
//! ├── app_logs.log              # Bounded diagnostic log
//! ├── url_cache_10485.json      # One feed URL per class
//! └── url_cache_10767.json
//! ```

pub mod cache;
pub mod local;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use cache::UrlCache;
pub use local::LocalStorage;

/// Trait for key/value storage backends.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw bytes stored under `key`, or `None` if absent.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace whatever is stored under `key`.
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Read `key` as UTF-8 text.
    async fn read_text(&self, key: &str) -> Result<Option<String>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            None => Ok(None),
        }
    }
}
