//! IP 地址处理工具
//!
//! - CIDR 解析与匹配（bogon 过滤使用）
//! - 连接地址处理（self 查询使用）

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// A parsed network block such as `192.168.0.0/16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    network: IpAddr,
    prefix_len: u8,
}

impl Cidr {
    pub fn new(network: IpAddr, prefix_len: u8) -> Option<Self> {
        let max = match network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        (prefix_len <= max).then_some(Self {
            network,
            prefix_len,
        })
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        match (ip, self.network) {
            (IpAddr::V4(ip), IpAddr::V4(net)) => {
                let mask = u32::MAX
                    .checked_shl(32 - self.prefix_len as u32)
                    .unwrap_or(0);
                let ip_bits = u32::from_be_bytes(ip.octets());
                let net_bits = u32::from_be_bytes(net.octets());
                (ip_bits & mask) == (net_bits & mask)
            }
            (IpAddr::V6(ip), IpAddr::V6(net)) => {
                let mask = u128::MAX
                    .checked_shl(128 - self.prefix_len as u32)
                    .unwrap_or(0);
                let ip_bits = u128::from_be_bytes(ip.octets());
                let net_bits = u128::from_be_bytes(net.octets());
                (ip_bits & mask) == (net_bits & mask)
            }
            _ => false, // IPv4 vs IPv6 不匹配
        }
    }
}

impl FromStr for Cidr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (network, prefix_len) = s
            .split_once('/')
            .ok_or_else(|| format!("missing prefix length in '{}'", s))?;

        let network: IpAddr = network
            .parse()
            .map_err(|e| format!("invalid network '{}': {}", network, e))?;
        let prefix_len: u8 = prefix_len
            .parse()
            .map_err(|e| format!("invalid prefix length '{}': {}", prefix_len, e))?;

        Cidr::new(network, prefix_len)
            .ok_or_else(|| format!("prefix length {} out of range in '{}'", prefix_len, s))
    }
}

/// Host part of a connection address, as the text used for lookups.
///
/// IPv4-mapped IPv6 peers (dual-stack listeners) are reported as IPv4.
pub fn peer_host(peer: &SocketAddr) -> String {
    peer.ip().to_canonical().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
        cidr.parse::<Cidr>().is_ok_and(|c| c.contains(ip))
    }

    #[test]
    fn test_ip_in_cidr_ipv4() {
        let ip: IpAddr = "192.168.1.100".parse().unwrap();
        assert!(ip_in_cidr(&ip, "192.168.1.0/24"));
        assert!(ip_in_cidr(&ip, "192.168.0.0/16"));
        assert!(!ip_in_cidr(&ip, "192.168.2.0/24"));
        assert!(!ip_in_cidr(&ip, "10.0.0.0/8"));
    }

    #[test]
    fn test_ip_in_cidr_ipv6() {
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(ip_in_cidr(&ip, "2001:db8::/32"));
        assert!(!ip_in_cidr(&ip, "2001:db9::/32"));
    }

    #[test]
    fn test_family_mismatch_never_matches() {
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        assert!(!ip_in_cidr(&ip, "::/0"));
    }

    #[test]
    fn test_zero_and_full_prefix() {
        let ip: IpAddr = "8.8.8.8".parse().unwrap();
        assert!(ip_in_cidr(&ip, "0.0.0.0/0"));
        assert!(ip_in_cidr(&ip, "8.8.8.8/32"));
        assert!(!ip_in_cidr(&ip, "8.8.8.9/32"));
    }

    #[test]
    fn test_invalid_cidr() {
        assert!("10.0.0.0".parse::<Cidr>().is_err());
        assert!("10.0.0.0/33".parse::<Cidr>().is_err());
        assert!("nonsense/8".parse::<Cidr>().is_err());
        assert!(!ip_in_cidr(&"10.0.0.1".parse().unwrap(), "10.0.0.0/abc"));
    }

    #[test]
    fn test_peer_host_strips_port() {
        let v4: SocketAddr = "203.0.113.7:51234".parse().unwrap();
        assert_eq!(peer_host(&v4), "203.0.113.7");

        let v6: SocketAddr = "[2001:db8::5]:443".parse().unwrap();
        assert_eq!(peer_host(&v6), "2001:db8::5");

        let mapped: SocketAddr = "[::ffff:198.51.100.2]:80".parse().unwrap();
        assert_eq!(peer_host(&mapped), "198.51.100.2");
    }
}
