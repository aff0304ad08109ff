use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::AddrResult;

/// 缓存查询结果
#[derive(Debug, Clone)]
pub enum CacheResult {
    /// 命中：之前成功解析过的结果
    Found(Arc<AddrResult>),
    /// 未命中，调用方继续解析
    Miss,
}

/// Hit/miss as reported in the `X-Cache` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_header_value(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_header_value())
    }
}

/// Cache of successful lookups, keyed by the normalized query token.
///
/// Implementations synchronize internally; callers never lock. Only
/// successful resolutions are ever inserted.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// An `Err` is an internal fault of the cache; callers treat it as a miss.
    async fn get(&self, key: &str) -> Result<CacheResult>;
    async fn insert(&self, key: &str, value: Arc<AddrResult>);
    async fn invalidate_all(&self);

    /// Number of live entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is cached, without counting as an access.
    fn contains(&self, key: &str) -> bool;

    fn name(&self) -> &'static str;
}
