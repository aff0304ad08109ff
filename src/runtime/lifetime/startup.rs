use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::MemoryResultCache;
use crate::config::StaticConfig;
use crate::services::{
    BogonFilter, LookupService, MaxMindBackend, MetadataGuard, QueryNormalizer,
};

use super::reload::DatabaseReloader;

pub struct StartupContext {
    pub backend: Arc<MaxMindBackend>,
    pub metadata: Arc<MetadataGuard>,
    pub lookup_service: Arc<LookupService>,
    pub invalidate_on_reload: bool,
}

impl StartupContext {
    pub fn reloader(&self) -> DatabaseReloader {
        DatabaseReloader::new(
            self.backend.clone(),
            self.metadata.clone(),
            self.lookup_service.clone(),
            self.invalidate_on_reload,
        )
    }
}

/// 准备服务器启动的上下文
/// 包括 GeoIP 数据库、缓存、bogon 过滤和查询服务
///
/// 数据库打开失败不会中止启动：查询返回 503，直到一次重载成功。
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let backend = Arc::new(MaxMindBackend::new(&config.database.path));
    let metadata = Arc::new(MetadataGuard::new());

    let loader = backend.clone();
    match tokio::task::spawn_blocking(move || loader.load())
        .await
        .context("GeoIP database loader task failed")?
    {
        Ok(loaded) => metadata.replace(loaded),
        Err(e) => warn!(
            "{}. Lookups will return 503 until the database is reloaded.",
            e
        ),
    }

    let cache = MemoryResultCache::new(config.cache.capacity)
        .context("Failed to create lookup cache")?;
    info!(
        "Lookup cache: ARC with capacity {} entries",
        cache.capacity()
    );

    let bogon = BogonFilter::reserved(config.lookup.filter_bogons);
    if !bogon.is_enabled() {
        warn!("Bogon filtering is disabled; private addresses are sent to the database");
    }

    let lookup_service = Arc::new(LookupService::new(
        QueryNormalizer::system(),
        Arc::new(cache),
        bogon,
        backend.clone(),
    ));

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        backend,
        metadata,
        lookup_service,
        invalidate_on_reload: config.cache.invalidate_on_reload,
    })
}
