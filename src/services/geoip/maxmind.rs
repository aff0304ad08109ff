//! MaxMind GeoIP2 数据库实现
//!
//! 使用本地 GeoIP2/GeoLite2-City.mmdb 文件进行 IP 地理位置查询。
//! Reader 放在 ArcSwapOption 中，重新加载时整体替换，进行中的查询不受影响。

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use maxminddb::Reader;
use maxminddb::geoip2::{City, Names};
use tracing::{info, trace};

use super::provider::GeoBackend;
use crate::errors::{GeoError, Result};
use crate::models::{AddrResult, DatabaseMetadata};

fn english(names: &Names<'_>) -> String {
    names.english.map(String::from).unwrap_or_default()
}

fn owned(value: Option<&str>) -> String {
    value.map(String::from).unwrap_or_default()
}

/// 将 GeoIP2 City 记录转换为 AddrResult（只取英文名称）
fn city_to_result(city: &City<'_>, ip: IpAddr) -> AddrResult {
    AddrResult {
        ip,
        summary: String::new(),
        city: english(&city.city.names),
        subdivision: city
            .subdivisions
            .first()
            .map(|s| english(&s.names))
            .unwrap_or_default(),
        country: english(&city.country.names),
        country_abbr: owned(city.country.iso_code),
        continent: english(&city.continent.names),
        continent_abbr: owned(city.continent.code),
        latitude: city.location.latitude.unwrap_or_default(),
        longitude: city.location.longitude.unwrap_or_default(),
        accuracy_radius: city.location.accuracy_radius.unwrap_or_default(),
        timezone: owned(city.location.time_zone),
        postal_code: owned(city.postal.code),
        map: String::new(),
    }
    .with_derived_fields()
}

/// MaxMind GeoIP backend
///
/// Starts empty; [`MaxMindBackend::load`] opens (or re-opens) the file at
/// the configured path and swaps the new reader in.
pub struct MaxMindBackend {
    path: PathBuf,
    reader: ArcSwapOption<Reader<Vec<u8>>>,
}

impl MaxMindBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reader: ArcSwapOption::empty(),
        }
    }

    /// Create a backend and load the database immediately.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let backend = Self::new(path);
        backend.load()?;
        Ok(backend)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.reader.load().is_some()
    }

    /// Read the database file and replace the active reader.
    ///
    /// Blocking file IO. On failure the previous reader stays active.
    pub fn load(&self) -> Result<DatabaseMetadata> {
        let reader = Reader::open_readfile(&self.path).map_err(|e| {
            GeoError::database_load(format!(
                "failed to open GeoIP database at {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let metadata = DatabaseMetadata {
            ip_version: reader.metadata.ip_version,
            build_epoch: reader.metadata.build_epoch,
            database_type: reader.metadata.database_type.clone(),
        };

        self.reader.store(Some(Arc::new(reader)));
        info!(
            "GeoIP: Loaded {} database from {} (build {})",
            metadata.database_type,
            self.path.display(),
            metadata
                .built_at()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| metadata.build_epoch.to_string())
        );

        Ok(metadata)
    }
}

#[async_trait]
impl GeoBackend for MaxMindBackend {
    async fn resolve(&self, ip: IpAddr) -> Result<AddrResult> {
        let reader = self
            .reader
            .load_full()
            .ok_or_else(|| GeoError::backend_unavailable("GeoIP database is not loaded"))?;

        let lookup = reader
            .lookup(ip)
            .map_err(|e| GeoError::backend_unavailable(format!("lookup {}: {}", ip, e)))?;

        // 数据库中没有该地址的记录时返回空字段结果
        let Some(city) = lookup
            .decode::<City<'_>>()
            .map_err(|e| GeoError::backend_unavailable(format!("decode {}: {}", ip, e)))?
        else {
            trace!("MaxMind has no record for {}", ip);
            return Ok(AddrResult::bare(ip).with_derived_fields());
        };

        trace!(
            "MaxMind lookup for {}: country={:?}, city={:?}",
            ip, city.country.iso_code, city.city.names.english
        );

        Ok(city_to_result(&city, ip))
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
