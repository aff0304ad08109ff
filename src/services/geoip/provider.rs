//! Resolution backend abstraction
//!
//! The lookup pipeline only sees [`GeoBackend`]; the MaxMind reader is the
//! production implementation, tests plug in their own.

use std::net::IpAddr;

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::AddrResult;

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoBackend: Send + Sync {
    /// Resolve a validated address.
    ///
    /// An address the database has no record for still resolves, with the
    /// enrichment fields left empty. Any failure is
    /// `GeoError::BackendUnavailable`; callers never retry.
    async fn resolve(&self, ip: IpAddr) -> Result<AddrResult>;

    /// 获取 backend 名称（用于日志）
    fn name(&self) -> &'static str;
}
