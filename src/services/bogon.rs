//! Bogon filtering
//!
//! Addresses in ranges that are never publicly routed are rejected before
//! they reach the GeoIP database. Classification is delegated to a
//! [`BogonOracle`]; an oracle failure lets the address through.

use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{GeoError, Result};
use crate::utils::ip::Cidr;

/// Decides whether an address is a bogon.
pub trait BogonOracle: Send + Sync {
    fn is_bogon(&self, ip: &IpAddr) -> Result<bool>;
}

/// IANA special-purpose and otherwise non-routable blocks.
const RESERVED_RANGES: &[&str] = &[
    // IPv4
    "0.0.0.0/8",
    "10.0.0.0/8",
    "100.64.0.0/10",
    "127.0.0.0/8",
    "169.254.0.0/16",
    "172.16.0.0/12",
    "192.0.0.0/24",
    "192.0.2.0/24",
    "192.88.99.0/24",
    "192.168.0.0/16",
    "198.18.0.0/15",
    "198.51.100.0/24",
    "203.0.113.0/24",
    "224.0.0.0/4",
    "240.0.0.0/4",
    "255.255.255.255/32",
    // IPv6
    "::/128",
    "::1/128",
    "::ffff:0:0/96",
    "::/96",
    "100::/64",
    "2001:10::/28",
    "2001:db8::/32",
    "fc00::/7",
    "fe80::/10",
    "fec0::/10",
    "ff00::/8",
];

/// Static table oracle over [`RESERVED_RANGES`].
pub struct ReservedRanges {
    ranges: Vec<Cidr>,
}

impl ReservedRanges {
    pub fn new() -> Self {
        Self {
            ranges: RESERVED_RANGES
                .iter()
                .filter_map(|c| c.parse().ok())
                .collect(),
        }
    }

    pub fn from_cidrs<'a>(cidrs: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let ranges = cidrs
            .into_iter()
            .map(|c| c.parse::<Cidr>().map_err(GeoError::config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { ranges })
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl Default for ReservedRanges {
    fn default() -> Self {
        Self::new()
    }
}

impl BogonOracle for ReservedRanges {
    fn is_bogon(&self, ip: &IpAddr) -> Result<bool> {
        Ok(self.ranges.iter().any(|range| range.contains(ip)))
    }
}

/// Gate in front of the backend.
#[derive(Clone)]
pub struct BogonFilter {
    enabled: bool,
    oracle: Arc<dyn BogonOracle>,
}

impl BogonFilter {
    pub fn new(enabled: bool, oracle: Arc<dyn BogonOracle>) -> Self {
        Self { enabled, oracle }
    }

    /// Filter over the built-in reserved ranges.
    pub fn reserved(enabled: bool) -> Self {
        Self::new(enabled, Arc::new(ReservedRanges::new()))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `Err(BogonRejected)` when filtering is on and the oracle says bogon.
    pub fn check(&self, ip: &IpAddr) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        match self.oracle.is_bogon(ip) {
            Ok(true) => {
                debug!("Rejecting bogon address {}", ip);
                Err(GeoError::bogon_rejected(ip.to_string()))
            }
            Ok(false) => Ok(()),
            Err(e) => {
                warn!("Bogon check for {} failed, allowing: {}", ip, e);
                Ok(())
            }
        }
    }
}
