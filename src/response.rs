//! Per-response header buffer.

use crate::cookies::{ResponseHeaders, header_name};

/// Headers buffered for a single response.
///
/// One context belongs to one request/response cycle and is passed around by
/// `&mut`. Once [`ResponseContext::mark_sent`] is called the buffer is frozen
/// and writes through [`ResponseHeaders`] are ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResponseContext {
    lines: Vec<String>,
    sent: bool,
}

impl ResponseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from already-buffered raw header lines
    pub fn with_headers<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            sent: false,
        }
    }

    /// Buffer another header alongside any existing ones
    pub fn header(&mut self, line: impl Into<String>) -> &mut Self {
        self.write_header(&line.into(), false);
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Values of every header called `name`, in order
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.lines.iter().filter_map(move |line| {
            let (line_name, value) = line.split_once(':')?;
            line_name
                .trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }

    /// Record that the headers went out on the wire
    pub fn mark_sent(&mut self) {
        self.sent = true;
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }
}

impl ResponseHeaders for ResponseContext {
    fn header_lines(&self) -> Vec<String> {
        self.lines.clone()
    }

    fn remove_header(&mut self, name: &str) {
        if self.sent {
            tracing::warn!(name, "cannot remove header, headers already sent");
            return;
        }
        self.lines
            .retain(|line| header_name(line).is_none_or(|n| !n.eq_ignore_ascii_case(name)));
    }

    fn write_header(&mut self, line: &str, replace: bool) {
        if self.sent {
            tracing::warn!(line, "cannot write header, headers already sent");
            return;
        }
        if replace && let Some(name) = header_name(line) {
            self.remove_header(name);
        }
        self.lines.push(line.to_string());
    }

    fn headers_sent(&self) -> bool {
        self.sent
    }
}
