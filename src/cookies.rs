//! `Set-Cookie` deduplication for buffered responses.
//!
//! When several `Set-Cookie` headers name the same cookie only the last one
//! should reach the client. The helpers here work against any header buffer
//! implementing [`ResponseHeaders`], so the hosting HTTP layer keeps owning
//! its own storage.

use crate::config::CookieConfig;
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace, warn};

/// Header name handled by [`remove_duplicate_cookies`]
pub const SET_COOKIE: &str = "Set-Cookie";

static SET_COOKIE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:set-cookie):\s*([^=\s][^=]*)=").expect("Set-Cookie pattern is valid")
});

/// Outgoing header buffer owned by the hosting HTTP layer.
///
/// Lines are raw `Name: value` strings. Implementations must keep the
/// insertion order of values sharing a name.
pub trait ResponseHeaders {
    /// Every buffered header line, in insertion order
    fn header_lines(&self) -> Vec<String>;

    /// Remove all headers called `name` (case-insensitive)
    fn remove_header(&mut self, name: &str);

    /// Buffer a raw header line
    ///
    /// With `replace` set, existing headers of the same name are dropped
    /// first; otherwise the line is added alongside them.
    fn write_header(&mut self, line: &str, replace: bool);

    /// Whether the headers already went out on the wire
    fn headers_sent(&self) -> bool;
}

/// Keep only the last `Set-Cookie` header written for each cookie name
///
/// Cookies are re-emitted in the order their names were first seen, each
/// carrying its most recent value. Does nothing once headers are sent or
/// when legacy cookie encryption is enabled, since rewriting them then would
/// either fail or break the encrypted values.
pub fn remove_duplicate_cookies<H>(headers: &mut H, config: &CookieConfig)
where
    H: ResponseHeaders + ?Sized,
{
    if headers.headers_sent() {
        trace!("headers already sent, leaving cookies alone");
        return;
    }
    if config.legacy_cookie_encryption {
        trace!("legacy cookie encryption active, leaving cookies alone");
        return;
    }

    let mut seen = 0usize;
    let mut flattened: Vec<(String, String)> = Vec::new();

    for line in headers.header_lines() {
        let Some(name) = cookie_name(&line).map(str::to_string) else {
            continue;
        };
        seen += 1;

        match flattened.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = line,
            None => flattened.push((name, line)),
        }
    }

    if flattened.is_empty() {
        return;
    }

    headers.remove_header(SET_COOKIE);
    for (index, (_, line)) in flattened.iter().enumerate() {
        headers.write_header(line, index == 0);
    }

    debug!(
        cookies = seen,
        kept = flattened.len(),
        "collapsed duplicate Set-Cookie headers"
    );
}

/// Cookie name of a `Set-Cookie: name=value` line, if it is one
pub fn cookie_name(line: &str) -> Option<&str> {
    SET_COOKIE_LINE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().trim())
}

/// Name part of a raw `Name: value` line
pub(crate) fn header_name(line: &str) -> Option<&str> {
    line.split_once(':').map(|(name, _)| name.trim())
}

/// Render header value bytes one char per byte (ISO-8859-1)
///
/// Obs-text bytes that are not valid UTF-8 survive the trip through a `String`
/// and come back unchanged in [`encode_value`].
fn decode_value(value: &HeaderValue) -> String {
    value.as_bytes().iter().copied().map(char::from).collect()
}

/// Inverse of [`decode_value`]; text beyond U+00FF is written as UTF-8
fn encode_value(text: &str) -> Option<HeaderValue> {
    match text.chars().map(u8::try_from).collect::<Result<Vec<u8>, _>>() {
        Ok(bytes) => HeaderValue::from_bytes(&bytes).ok(),
        Err(_) => HeaderValue::from_str(text).ok(),
    }
}

/// Strip optional whitespace (SP / HTAB) around a header field
fn trim_ows(text: &str) -> &str {
    text.trim_matches([' ', '\t'])
}

impl ResponseHeaders for HeaderMap {
    fn header_lines(&self) -> Vec<String> {
        self.iter()
            .map(|(name, value)| format!("{}: {}", name.as_str(), decode_value(value)))
            .collect()
    }

    fn remove_header(&mut self, name: &str) {
        if let Ok(name) = HeaderName::try_from(name) {
            self.remove(name);
        }
    }

    fn write_header(&mut self, line: &str, replace: bool) {
        let Some((name, value)) = line.split_once(':') else {
            warn!(line, "dropping header line without a colon");
            return;
        };

        let parsed = HeaderName::try_from(trim_ows(name))
            .ok()
            .zip(encode_value(trim_ows(value)));
        let Some((name, value)) = parsed else {
            warn!(line, "dropping header line that is not valid HTTP");
            return;
        };

        if replace {
            self.insert(name, value);
        } else {
            self.append(name, value);
        }
    }

    fn headers_sent(&self) -> bool {
        false
    }
}
