//! Shared fixtures for integration tests
//!
//! An in-memory backend and resolver stand in for the MaxMind database
//! and DNS so the full lookup pipeline runs without external files.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use ipgeo::cache::{CacheResult, MemoryResultCache, ResultCache};
use ipgeo::errors::{GeoError, Result};
use ipgeo::models::AddrResult;
use ipgeo::services::{
    BogonFilter, GeoBackend, HostResolver, LookupService, MetadataGuard, QueryNormalizer,
};

// =============================================================================
// Backend
// =============================================================================

/// Backend answering from a fixed table.
pub struct StaticBackend {
    records: HashMap<IpAddr, AddrResult>,
    unavailable: HashSet<IpAddr>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticBackend {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            unavailable: HashSet::new(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_record(mut self, result: AddrResult) -> Self {
        self.records.insert(result.ip, result);
        self
    }

    /// Lookups for `ip` fail as if the database were down.
    pub fn with_unavailable(mut self, ip: &str) -> Self {
        self.unavailable.insert(ip.parse().unwrap());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoBackend for StaticBackend {
    async fn resolve(&self, ip: IpAddr) -> Result<AddrResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable.contains(&ip) {
            return Err(GeoError::backend_unavailable("database offline"));
        }
        Ok(self
            .records
            .get(&ip)
            .cloned()
            .unwrap_or_else(|| AddrResult::bare(ip).with_derived_fields()))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

// =============================================================================
// Resolver
// =============================================================================

pub struct StaticHostResolver {
    hosts: HashMap<String, Vec<IpAddr>>,
    lookups: AtomicUsize,
}

impl StaticHostResolver {
    pub fn new() -> Self {
        Self {
            hosts: HashMap::new(),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_host(mut self, host: &str, addrs: &[&str]) -> Self {
        self.hosts.insert(
            host.to_string(),
            addrs.iter().map(|a| a.parse().unwrap()).collect(),
        );
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostResolver for StaticHostResolver {
    async fn lookup_host(&self, host: &str) -> std::io::Result<Vec<IpAddr>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.hosts.get(host).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such host")
        })
    }
}

// =============================================================================
// Cache
// =============================================================================

/// Cache whose reads always fail and whose writes are dropped.
pub struct FailingCache;

#[async_trait]
impl ResultCache for FailingCache {
    async fn get(&self, _key: &str) -> Result<CacheResult> {
        Err(GeoError::cache_read("cache store unreachable"))
    }

    async fn insert(&self, _key: &str, _value: Arc<AddrResult>) {}

    async fn invalidate_all(&self) {}

    fn len(&self) -> usize {
        0
    }

    fn contains(&self, _key: &str) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

// =============================================================================
// Sample data
// =============================================================================

pub fn mountain_view() -> AddrResult {
    AddrResult {
        city: "Mountain View".to_string(),
        subdivision: "California".to_string(),
        country: "United States".to_string(),
        country_abbr: "US".to_string(),
        continent: "North America".to_string(),
        continent_abbr: "NA".to_string(),
        latitude: 37.751,
        longitude: -97.822,
        accuracy_radius: 1000,
        timezone: "America/Chicago".to_string(),
        ..AddrResult::bare("8.8.8.8".parse().unwrap())
    }
    .with_derived_fields()
}

pub fn sydney() -> AddrResult {
    AddrResult {
        city: "Sydney".to_string(),
        subdivision: "New South Wales".to_string(),
        country: "Australia".to_string(),
        country_abbr: "AU".to_string(),
        continent: "Oceania".to_string(),
        continent_abbr: "OC".to_string(),
        latitude: -33.494,
        longitude: 143.2104,
        accuracy_radius: 1000,
        timezone: "Australia/Sydney".to_string(),
        postal_code: "2000".to_string(),
        ..AddrResult::bare("1.1.1.1".parse().unwrap())
    }
    .with_derived_fields()
}

pub fn google_v6() -> AddrResult {
    AddrResult {
        country: "United States".to_string(),
        country_abbr: "US".to_string(),
        ..AddrResult::bare("2001:4860:4860::8888".parse().unwrap())
    }
    .with_derived_fields()
}

/// Record for a private address, reachable only with bogon filtering off.
pub fn private_office() -> AddrResult {
    AddrResult {
        city: "Intranet".to_string(),
        ..AddrResult::bare("10.0.0.1".parse().unwrap())
    }
    .with_derived_fields()
}

pub fn sample_backend() -> StaticBackend {
    StaticBackend::new()
        .with_record(mountain_view())
        .with_record(sydney())
        .with_record(google_v6())
        .with_record(private_office())
        .with_unavailable("9.9.9.9")
}

pub fn sample_resolver() -> StaticHostResolver {
    StaticHostResolver::new()
        .with_host("dns.google", &["8.8.8.8", "8.8.4.4"])
        .with_host("one.one.one.one", &["1.1.1.1"])
        .with_host("intranet.test", &["10.0.0.1"])
        .with_host("nowhere.test", &[])
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub service: Arc<LookupService>,
    pub backend: Arc<StaticBackend>,
    pub resolver: Arc<StaticHostResolver>,
    pub metadata: Arc<MetadataGuard>,
}

pub struct HarnessBuilder {
    backend: StaticBackend,
    resolver: StaticHostResolver,
    cache: Option<Arc<dyn ResultCache>>,
    bogon: BogonFilter,
    capacity: usize,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            backend: sample_backend(),
            resolver: sample_resolver(),
            cache: None,
            bogon: BogonFilter::reserved(true),
            capacity: 64,
        }
    }

    pub fn backend(mut self, backend: StaticBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn bogon(mut self, bogon: BogonFilter) -> Self {
        self.bogon = bogon;
        self
    }

    pub fn build(self) -> Harness {
        let backend = Arc::new(self.backend);
        let resolver = Arc::new(self.resolver);
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryResultCache::new(self.capacity).unwrap()));

        let service = Arc::new(LookupService::new(
            QueryNormalizer::new(resolver.clone()),
            cache,
            self.bogon,
            backend.clone(),
        ));

        Harness {
            service,
            backend,
            resolver,
            metadata: Arc::new(MetadataGuard::new()),
        }
    }
}

pub fn harness() -> Harness {
    HarnessBuilder::new().build()
}
