//! HTTP helpers - small stateless routines for HTTP responses and requests
//!
//! This crate provides:
//! - HTTP-date rendering (`Sun, 06 Nov 1994 08:49:37 GMT`)
//! - CIDR membership checks for IPv4 and IPv6 addresses
//! - Deduplication of repeated `Set-Cookie` response headers
//!
//! ## Architecture
//!
//! - `date` - timestamp normalization and HTTP-date formatting
//! - `ip` - CIDR parsing and matching, failing closed on bad input
//! - `cookies` - the `ResponseHeaders` collaborator trait and cookie deduplication
//! - `response` - an explicit per-response header buffer
//! - `config/` - configuration structures and environment loading
//! - `middleware/` - actix-web middleware applying the cookie rules to every response
//! - `utils/` - client address extraction for incoming requests
//!
//! ## Quick Start
//!
//! ```
//! use http_helpers::{CookieConfig, ResponseContext, format_date, ip_match, remove_duplicate_cookies};
//!
//! assert_eq!(format_date(784111777).unwrap(), "Sun, 06 Nov 1994 08:49:37 GMT");
//! assert!(ip_match("192.168.1.5", "192.168.1.0/24"));
//!
//! let mut response = ResponseContext::with_headers(["Set-Cookie: a=1", "Set-Cookie: a=2"]);
//! remove_duplicate_cookies(&mut response, &CookieConfig::default());
//! assert_eq!(response.lines(), ["Set-Cookie: a=2"]);
//! ```

pub mod config;
pub mod cookies;
pub mod date;
pub mod error;
pub mod ip;
pub mod middleware;
pub mod response;
pub mod utils;

pub use config::{CookieConfig, ProxyConfig};
pub use cookies::{ResponseHeaders, SET_COOKIE, cookie_name, remove_duplicate_cookies};
pub use date::{Timestamp, format_date};
pub use error::HelperError;
pub use ip::{CidrBlock, ip_match};
pub use middleware::{DedupCookies, DedupCookiesMiddleware};
pub use response::ResponseContext;
pub use utils::{client_ip_matches, extract_client_ip};
