//! Lookup orchestration
//!
//! token -> cache key -> cache -> address -> bogon gate -> backend -> cache.
//! The cache sits in front of hostname resolution, so a cached hostname is
//! served without touching DNS. Only successful results are cached.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::bogon::BogonFilter;
use super::geoip::GeoBackend;
use super::normalizer::QueryNormalizer;
use crate::cache::{CacheResult, CacheStatus, ResultCache};
use crate::errors::Result;
use crate::models::AddrResult;

/// A resolved lookup and whether it came from the cache.
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub result: Arc<AddrResult>,
    pub cache_status: CacheStatus,
}

/// Service for address lookups
///
/// Shared by every request handler (and the `lookup` CLI command). All
/// collaborators are internally synchronized; the service itself holds no
/// mutable state.
pub struct LookupService {
    normalizer: QueryNormalizer,
    cache: Arc<dyn ResultCache>,
    bogon: BogonFilter,
    backend: Arc<dyn GeoBackend>,
}

impl LookupService {
    pub fn new(
        normalizer: QueryNormalizer,
        cache: Arc<dyn ResultCache>,
        bogon: BogonFilter,
        backend: Arc<dyn GeoBackend>,
    ) -> Self {
        Self {
            normalizer,
            cache,
            bogon,
            backend,
        }
    }

    pub fn cache(&self) -> &Arc<dyn ResultCache> {
        &self.cache
    }

    pub fn backend(&self) -> &Arc<dyn GeoBackend> {
        &self.backend
    }

    /// Drop every cached result (used after a database reload).
    pub async fn invalidate_cache(&self) {
        let before = self.cache.len();
        self.cache.invalidate_all().await;
        debug!("Invalidated {} cached lookups", before);
    }

    /// Resolve a request token.
    ///
    /// `peer` is the connection address; it is only needed when the token
    /// is a self-alias. Concurrent misses for the same key may each hit the
    /// backend; the cache ends up with one entry either way.
    #[instrument(skip(self), fields(token = %token))]
    pub async fn lookup(&self, token: &str, peer: Option<SocketAddr>) -> Result<LookupOutcome> {
        let key = self.normalizer.cache_key(token, peer)?;

        match self.cache.get(&key).await {
            Ok(CacheResult::Found(result)) => {
                debug!("Cache hit for {}", key);
                return Ok(LookupOutcome {
                    result,
                    cache_status: CacheStatus::Hit,
                });
            }
            Ok(CacheResult::Miss) => {
                debug!("Cache miss for {}", key);
            }
            Err(e) => {
                warn!(
                    "{} cache read failed for {}, treating as miss: {}",
                    self.cache.name(),
                    key,
                    e
                );
            }
        }

        let ip = self.normalizer.resolve_address(&key).await?;
        self.bogon.check(&ip)?;

        let result = Arc::new(self.backend.resolve(ip).await?);
        self.cache.insert(&key, Arc::clone(&result)).await;

        Ok(LookupOutcome {
            result,
            cache_status: CacheStatus::Miss,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::cache::MemoryResultCache;
    use crate::errors::GeoError;
    use crate::services::normalizer::HostResolver;

    struct CountingBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeoBackend for CountingBackend {
        async fn resolve(&self, ip: IpAddr) -> Result<AddrResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if ip.to_string() == "9.9.9.9" {
                return Err(GeoError::backend_unavailable("database offline"));
            }
            Ok(AddrResult {
                country: "Testland".to_string(),
                ..AddrResult::bare(ip)
            }
            .with_derived_fields())
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    struct NoDns;

    #[async_trait]
    impl HostResolver for NoDns {
        async fn lookup_host(&self, host: &str) -> std::io::Result<Vec<IpAddr>> {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such host {}", host),
            ))
        }
    }

    fn service() -> (LookupService, Arc<CountingBackend>) {
        let backend = Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
        });
        let service = LookupService::new(
            QueryNormalizer::new(Arc::new(NoDns)),
            Arc::new(MemoryResultCache::new(16).unwrap()),
            BogonFilter::reserved(true),
            backend.clone(),
        );
        (service, backend)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (service, backend) = service();

        let first = service.lookup("8.8.8.8", None).await.unwrap();
        assert_eq!(first.cache_status, CacheStatus::Miss);

        let second = service.lookup("8.8.8.8", None).await.unwrap();
        assert_eq!(second.cache_status, CacheStatus::Hit);
        assert!(Arc::ptr_eq(&first.result, &second.result));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let (service, backend) = service();

        for _ in 0..2 {
            let err = service.lookup("9.9.9.9", None).await.unwrap_err();
            assert!(matches!(err, GeoError::BackendUnavailable(_)));
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_bogon_never_reaches_backend() {
        let (service, backend) = service();
        let err = service.lookup("10.0.0.1", None).await.unwrap_err();
        assert!(matches!(err, GeoError::BogonRejected(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let (service, backend) = service();
        let err = service.lookup("nowhere.invalid", None).await.unwrap_err();
        assert!(matches!(err, GeoError::Normalization(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_self_alias_keyed_by_peer() {
        let (service, _) = service();
        let peer: SocketAddr = "1.1.1.1:5555".parse().unwrap();

        let outcome = service.lookup("me", Some(peer)).await.unwrap();
        assert_eq!(outcome.result.ip.to_string(), "1.1.1.1");
        assert!(service.cache().contains("1.1.1.1"));
        assert!(!service.cache().contains("me"));
    }

    #[tokio::test]
    async fn test_invalidate_cache() {
        let (service, _) = service();
        service.lookup("8.8.8.8", None).await.unwrap();
        service.invalidate_cache().await;
        assert!(service.cache().is_empty());
        assert_eq!(
            service.lookup("8.8.8.8", None).await.unwrap().cache_status,
            CacheStatus::Miss
        );
    }
}
