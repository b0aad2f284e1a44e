//! Cookie handling configuration.

use std::env;

/// Configuration consulted before rewriting `Set-Cookie` headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieConfig {
    /// Host encrypts cookies transparently; their headers must not be rewritten
    pub legacy_cookie_encryption: bool,
}

impl CookieConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let legacy_cookie_encryption = env::var("LEGACY_COOKIE_ENCRYPTION")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self {
            legacy_cookie_encryption,
        }
    }
}

/// `true`/`1`/`yes`/`on`, ignoring case and surrounding whitespace
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
