//! Request-side helpers built on CIDR matching.

use crate::{config::ProxyConfig, ip::ip_match};
use actix_web::HttpRequest;

/// Headers reverse proxies use to report the original client, most trusted first
const FORWARDING_HEADERS: [&str; 5] = [
    "X-Forwarded-For",
    "X-Real-IP",
    "CF-Connecting-IP", // Cloudflare
    "X-Cluster-Client-IP",
    "Forwarded-For",
];

/// Extract the client IP address of a request
///
/// Forwarding headers are only believed when the direct peer is one of the
/// configured trusted proxies; otherwise the peer address itself is returned.
pub fn extract_client_ip(req: &HttpRequest, proxies: &ProxyConfig) -> Option<String> {
    let peer = req.peer_addr().map(|addr| addr.ip().to_string());

    let behind_trusted_proxy = peer.as_deref().is_some_and(|peer| {
        proxies
            .trusted_proxies
            .iter()
            .any(|mask| ip_match(peer, mask))
    });

    if behind_trusted_proxy {
        for header_name in FORWARDING_HEADERS {
            let forwarded = req
                .headers()
                .get(header_name)
                .and_then(|value| value.to_str().ok())
                // X-Forwarded-For can carry a chain, the first hop is the client
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .filter(|ip| !ip.is_empty());

            if let Some(ip) = forwarded {
                return Some(ip.to_string());
            }
        }
    }

    peer
}

/// Does the client address fall inside any of `masks`?
///
/// Fails closed when no client address can be determined.
pub fn client_ip_matches<M: AsRef<str>>(
    req: &HttpRequest,
    proxies: &ProxyConfig,
    masks: &[M],
) -> bool {
    let Some(ip) = extract_client_ip(req, proxies) else {
        tracing::debug!("no client address available, denying match");
        return false;
    };

    masks.iter().any(|mask| ip_match(&ip, mask.as_ref()))
}
