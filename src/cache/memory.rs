use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::cache::arc::ArcCache;
use crate::cache::{CacheResult, ResultCache};
use crate::errors::{GeoError, Result};
use crate::models::AddrResult;

/// In-process lookup cache using adaptive replacement.
pub struct MemoryResultCache {
    inner: ArcCache<String, Arc<AddrResult>>,
}

impl MemoryResultCache {
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| GeoError::config("cache capacity must be greater than 0"))?;

        debug!("MemoryResultCache initialized with capacity: {}", capacity);
        Ok(Self {
            inner: ArcCache::new(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

#[async_trait]
impl ResultCache for MemoryResultCache {
    async fn get(&self, key: &str) -> Result<CacheResult> {
        Ok(match self.inner.get(key) {
            Some(result) => CacheResult::Found(result),
            None => CacheResult::Miss,
        })
    }

    async fn insert(&self, key: &str, value: Arc<AddrResult>) {
        self.inner.insert(key.to_string(), value);
    }

    async fn invalidate_all(&self) {
        self.inner.clear();
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    fn name(&self) -> &'static str {
        "memory-arc"
    }
}
