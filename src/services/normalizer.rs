//! Query normalization
//!
//! Turns the `{addr}` path token into a cache key and, on a cache miss,
//! into a concrete address.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::{GeoError, Result};
use crate::utils::ip::peer_host;

/// Tokens that stand for the caller's own address.
pub const SELF_ALIASES: [&str; 2] = ["self", "me"];

pub fn is_self_alias(token: &str) -> bool {
    SELF_ALIASES
        .iter()
        .any(|alias| token.eq_ignore_ascii_case(alias))
}

/// Forward hostname resolution.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn lookup_host(&self, host: &str) -> std::io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the system (`getaddrinfo`) via tokio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHostResolver;

#[async_trait]
impl HostResolver for SystemHostResolver {
    async fn lookup_host(&self, host: &str) -> std::io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

#[derive(Clone)]
pub struct QueryNormalizer {
    resolver: Arc<dyn HostResolver>,
}

impl QueryNormalizer {
    pub fn new(resolver: Arc<dyn HostResolver>) -> Self {
        Self { resolver }
    }

    pub fn system() -> Self {
        Self::new(Arc::new(SystemHostResolver))
    }

    /// Cache key for a request token.
    ///
    /// Self-aliases become the caller's address (port stripped) so callers
    /// never share an entry; anything else is kept exactly as received.
    /// This only sees the direct peer, not a client behind a proxy.
    pub fn cache_key(&self, token: &str, peer: Option<SocketAddr>) -> Result<String> {
        if !is_self_alias(token) {
            return Ok(token.to_string());
        }

        peer.map(|addr| peer_host(&addr)).ok_or_else(|| {
            GeoError::normalization(format!(
                "cannot resolve '{}' without a peer address",
                token
            ))
        })
    }

    /// Literal address, or the first address the hostname resolves to.
    ///
    /// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) come back as IPv4.
    pub async fn resolve_address(&self, key: &str) -> Result<IpAddr> {
        if let Ok(ip) = key.parse::<IpAddr>() {
            return Ok(ip.to_canonical());
        }

        let addrs = self.resolver.lookup_host(key).await.map_err(|e| {
            debug!("error looking up {:?} as host address: {}", key, e);
            GeoError::normalization(format!("lookup {}: {}", key, e))
        })?;

        addrs.first().map(IpAddr::to_canonical).ok_or_else(|| {
            debug!("host {:?} resolved to no addresses", key);
            GeoError::normalization(format!("lookup {}: no addresses", key))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixedResolver(HashMap<&'static str, Vec<IpAddr>>);

    #[async_trait]
    impl HostResolver for FixedResolver {
        async fn lookup_host(&self, host: &str) -> std::io::Result<Vec<IpAddr>> {
            self.0.get(host).cloned().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such host")
            })
        }
    }

    fn normalizer() -> QueryNormalizer {
        let mut hosts = HashMap::new();
        hosts.insert(
            "dns.example",
            vec!["192.0.2.53".parse().unwrap(), "192.0.2.54".parse().unwrap()],
        );
        hosts.insert("empty.example", vec![]);
        hosts.insert("mapped.example", vec!["::ffff:192.0.2.80".parse().unwrap()]);
        QueryNormalizer::new(Arc::new(FixedResolver(hosts)))
    }

    #[test]
    fn test_self_alias_detection() {
        for alias in ["self", "SELF", "Self", "me", "ME", "mE"] {
            assert!(is_self_alias(alias), "{}", alias);
        }
        for token in ["myself", "m", "", "8.8.8.8"] {
            assert!(!is_self_alias(token), "{}", token);
        }
    }

    #[test]
    fn test_cache_key_self_uses_peer_host() {
        let n = normalizer();
        let peer: SocketAddr = "198.51.100.20:40000".parse().unwrap();
        assert_eq!(n.cache_key("SELF", Some(peer)).unwrap(), "198.51.100.20");
        assert_eq!(n.cache_key("me", Some(peer)).unwrap(), "198.51.100.20");
    }

    #[test]
    fn test_cache_key_self_without_peer() {
        let n = normalizer();
        assert!(matches!(
            n.cache_key("self", None),
            Err(GeoError::Normalization(_))
        ));
    }

    #[test]
    fn test_cache_key_preserves_token() {
        let n = normalizer();
        assert_eq!(n.cache_key("Dns.Example", None).unwrap(), "Dns.Example");
    }

    #[tokio::test]
    async fn test_resolve_literal() {
        let n = normalizer();
        assert_eq!(
            n.resolve_address("2001:4860:4860::8888").await.unwrap(),
            "2001:4860:4860::8888".parse::<IpAddr>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_resolve_unmaps_ipv4_mapped() {
        let n = normalizer();
        let v4: IpAddr = "8.8.8.8".parse().unwrap();
        assert_eq!(n.resolve_address("::ffff:8.8.8.8").await.unwrap(), v4);
        assert_eq!(n.resolve_address("::FFFF:808:808").await.unwrap(), v4);
        assert_eq!(
            n.resolve_address("mapped.example").await.unwrap(),
            "192.0.2.80".parse::<IpAddr>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_resolve_hostname_takes_first() {
        let n = normalizer();
        assert_eq!(
            n.resolve_address("dns.example").await.unwrap(),
            "192.0.2.53".parse::<IpAddr>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_resolve_failures() {
        let n = normalizer();
        assert!(matches!(
            n.resolve_address("missing.example").await,
            Err(GeoError::Normalization(_))
        ));
        assert!(matches!(
            n.resolve_address("empty.example").await,
            Err(GeoError::Normalization(_))
        ));
    }
}
