//! Rendered page cache
//!
//! Caches whole rendered responses (body + content type) for a fixed TTL:
//! - Pluggable storage (`MemoryStore` per process, `RedisStore` shared)
//! - Versioned key schema
//! - Explicit clear of every cached page
//! - Metrics integration
//!
//! A cached page is served unchanged until it expires or the cache is cleared,
//! whatever happens to the data it was rendered from.

mod error;
mod keys;
mod memory;
mod metrics;
mod redis_store;

pub use error::{CacheError, CacheResult};
pub use keys::{CacheKey, CACHE_VERSION};
pub use memory::{MemoryStore, DEFAULT_MAX_ENTRIES};
pub use metrics::{CacheMetrics, PAGE_CACHE_EVENTS};
pub use redis_store::{RedisStore, SharedRedis};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default TTL for cached pages (seconds)
pub const DEFAULT_PAGE_TTL_SECS: u64 = 20;

/// Key-value storage with per-entry expiry
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a live value
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a value, replacing any previous one
    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Delete a key
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Delete every key starting with `prefix`, returning how many were removed
    async fn clear(&self, prefix: &str) -> CacheResult<usize>;

    /// Health check (optional)
    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }
}

/// An opaque rendered response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPage {
    pub content_type: String,
    pub body: String,
}

impl CachedPage {
    pub fn new(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub fn json(body: impl Into<String>) -> Self {
        Self::new("application/json", body)
    }
}

/// Page cache service with an init/clear lifecycle
#[derive(Clone)]
pub struct PageCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    metrics: CacheMetrics,
}

impl PageCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            metrics: CacheMetrics::new(),
        }
    }

    /// Process-local cache holding at most `max_entries` pages
    pub fn in_memory(ttl: Duration, max_entries: u64) -> Self {
        Self::new(Arc::new(MemoryStore::new(max_entries)), ttl)
    }

    /// Look up a cached page. Undecodable entries are dropped and reported as a miss.
    pub async fn get(&self, key: &str) -> CacheResult<Option<CachedPage>> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Page cache read failed");
                self.metrics.record_error();
                return Err(e);
            }
        };

        match raw {
            Some(data) => match serde_json::from_str::<CachedPage>(&data) {
                Ok(page) => {
                    debug!(key = %key, "Page cache hit");
                    self.metrics.record_hit();
                    Ok(Some(page))
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Page cache entry corrupted");
                    self.metrics.record_error();
                    let _ = self.store.del(key).await;
                    Ok(None)
                }
            },
            None => {
                debug!(key = %key, "Page cache miss");
                self.metrics.record_miss();
                Ok(None)
            }
        }
    }

    /// Store a rendered page for the configured TTL
    pub async fn put(&self, key: &str, page: &CachedPage) -> CacheResult<()> {
        let data = serde_json::to_string(page)?;
        if let Err(e) = self.store.set(key, data, self.ttl).await {
            warn!(key = %key, error = %e, "Page cache write failed");
            self.metrics.record_error();
            return Err(e);
        }

        debug!(key = %key, ttl_secs = self.ttl.as_secs(), "Page cache set");
        self.metrics.record_write();
        Ok(())
    }

    /// Drop every cached page immediately
    pub async fn clear(&self) -> CacheResult<usize> {
        let removed = self.store.clear(&CacheKey::page_prefix()).await?;
        debug!(removed, "Page cache cleared");
        self.metrics.record_clear();
        Ok(removed)
    }

    pub async fn ping(&self) -> CacheResult<()> {
        self.store.ping().await
    }
}
