//! Rate limiting for the authentication endpoints.
//!
//! Registration and login are throttled per client IP (~10 requests per
//! minute) to slow down credential stuffing.
//!
//! The client IP is the peer address unless the portal is configured to sit
//! behind a trusted proxy (`PORTAL_TRUSTED_PROXY`). Without a proxy that
//! overwrites `X-Forwarded-For`, callers could pick their own bucket.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor for the client IP.
///
/// With `trust_proxy`, the first `X-Forwarded-For` hop (then `X-Real-IP`) wins
/// and the peer address is the fallback. Otherwise only the peer address is
/// used.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy: bool,
}

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let forwarded = if self.trust_proxy {
            // X-Forwarded-For is a chain; the first entry is the client.
            ["x-forwarded-for", "x-real-ip"]
                .iter()
                .find_map(|name| header_ip(req, name))
        } else {
            None
        };

        forwarded
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. `per_second(6)` and `burst_size(5)` are
/// always accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(key: ClientIpKeyExtractor) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(key)
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    const DIRECT: ClientIpKeyExtractor = ClientIpKeyExtractor { trust_proxy: false };
    const PROXIED: ClientIpKeyExtractor = ClientIpKeyExtractor { trust_proxy: true };

    fn request_from(peer: &str, forwarded_for: Option<&str>) -> Request<()> {
        let mut builder = Request::builder();
        if let Some(value) = forwarded_for {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut req = builder.body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        req
    }

    #[test]
    fn test_trusted_proxy_uses_first_forwarded_hop() {
        let req = request_from("10.0.0.1:443", Some("203.0.113.7, 10.0.0.1"));
        let ip = PROXIED.extract(&req).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_direct_ignores_forwarded_headers() {
        let req = request_from("192.0.2.1:5000", Some("203.0.113.7"));
        let ip = DIRECT.extract(&req).unwrap();
        assert_eq!(ip, "192.0.2.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_trusted_proxy_falls_back_to_peer_address() {
        let req = request_from("192.0.2.1:5000", None);
        let ip = PROXIED.extract(&req).unwrap();
        assert_eq!(ip, "192.0.2.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_no_address_is_an_error() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .body(())
            .unwrap();
        assert!(DIRECT.extract(&req).is_err());
    }
}
