//! GeoIP 服务模块
//!
//! 提供 IP 地址地理位置查询功能：
//! - MaxMind GeoIP2 / GeoLite2 City 本地数据库

mod maxmind;
mod provider;

pub use maxmind::MaxMindBackend;
pub use provider::GeoBackend;
