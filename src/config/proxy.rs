//! Trusted proxy configuration.

use std::env;

/// Which peers may report the client address through forwarding headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    /// CIDR masks of reverse proxies whose `X-Forwarded-For` style headers are honored
    pub trusted_proxies: Vec<String>,
}

impl ProxyConfig {
    pub fn new<I, S>(trusted_proxies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trusted_proxies: trusted_proxies.into_iter().map(Into::into).collect(),
        }
    }

    /// Load configuration from environment variables, falling back to defaults
    ///
    /// `TRUSTED_PROXIES` is a comma separated list such as `10.0.0.0/8, ::1`.
    pub fn from_env() -> Self {
        let trusted_proxies = env::var("TRUSTED_PROXIES")
            .map(|v| parse_list(&v))
            .unwrap_or_default();

        Self { trusted_proxies }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
