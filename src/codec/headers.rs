//! Ordered, case-preserving header mappings.
//!
//! # Responsibilities
//! - Keep header names exactly as first written (the wire is case-sensitive)
//! - Look names up case-insensitively
//! - Reject names that are invalid for the mapping's kind
//!
//! # Design Decisions
//! - Two kinds of mapping: request headers and content headers. A name that
//!   only describes a body (length, type, ...) is rejected by the request
//!   mapping, and well-known request/general names are rejected by the
//!   content mapping.
//! - Values are stored unjoined; joining happens at encode time.

use thiserror::Error;

/// Header names that only make sense next to a body.
const CONTENT_HEADERS: &[&str] = &[
    "Allow",
    "Content-Disposition",
    "Content-Encoding",
    "Content-Language",
    "Content-Length",
    "Content-Location",
    "Content-MD5",
    "Content-Range",
    "Content-Type",
    "Expires",
    "Last-Modified",
];

/// Request and general header names that are never content headers.
const REQUEST_HEADERS: &[&str] = &[
    "Accept",
    "Accept-Charset",
    "Accept-Encoding",
    "Accept-Language",
    "Authorization",
    "Cache-Control",
    "Connection",
    "Cookie",
    "Date",
    "Expect",
    "From",
    "Host",
    "If-Match",
    "If-Modified-Since",
    "If-None-Match",
    "If-Range",
    "If-Unmodified-Since",
    "Max-Forwards",
    "Pragma",
    "Proxy-Authorization",
    "Range",
    "Referer",
    "TE",
    "Trailer",
    "Transfer-Encoding",
    "Upgrade",
    "User-Agent",
    "Via",
    "Warning",
];

/// Returns true if `name` is a content header (case-insensitive).
pub fn is_content_header(name: &str) -> bool {
    CONTENT_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

fn is_request_header(name: &str) -> bool {
    REQUEST_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// RFC 9110 `token`.
pub(crate) fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^'
                        | b'_' | b'`' | b'|' | b'~'
                )
        })
}

/// Which set of headers a mapping holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// Request-level headers.
    Request,
    /// Headers describing the body.
    Content,
}

/// Why a header was not accepted by a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("invalid header name {0:?}")]
    InvalidName(String),

    #[error("header value for {0:?} contains a line break")]
    InvalidValue(String),

    #[error("header {name:?} is not valid in {kind:?} headers")]
    WrongKind { name: String, kind: HeaderKind },
}

/// A single header with all its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    name: String,
    values: Vec<String>,
}

impl HeaderEntry {
    /// The name as first written.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Values joined the way they go on the wire.
    ///
    /// `User-Agent` (exact spelling) is joined with a space, everything else
    /// with a comma. Cookies get no special treatment.
    #[cfg(test)]
    pub(crate) fn joined(&self) -> String {
        self.values.join(self.separator())
    }

    /// Separator placed between values on the wire.
    pub fn separator(&self) -> &'static str {
        if self.name == "User-Agent" {
            " "
        } else {
            ","
        }
    }
}

/// Ordered header mapping with case-insensitive lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields {
    kind: HeaderKind,
    entries: Vec<HeaderEntry>,
}

impl HeaderFields {
    /// Empty mapping for request headers.
    pub fn request() -> Self {
        Self { kind: HeaderKind::Request, entries: Vec::new() }
    }

    /// Empty mapping for content headers.
    pub fn content() -> Self {
        Self { kind: HeaderKind::Content, entries: Vec::new() }
    }

    /// Check whether this mapping would accept `name`.
    pub fn accepts(&self, name: &str) -> bool {
        is_token(name)
            && match self.kind {
                HeaderKind::Request => !is_content_header(name),
                HeaderKind::Content => !is_request_header(name),
            }
    }

    /// Append a value, adding to an existing entry if the name is already present.
    pub fn try_append(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        if !is_token(name) {
            return Err(HeaderError::InvalidName(name.to_string()));
        }
        if !self.accepts(name) {
            return Err(HeaderError::WrongKind { name: name.to_string(), kind: self.kind });
        }
        if value.contains(['\r', '\n']) {
            return Err(HeaderError::InvalidValue(name.to_string()));
        }

        match self.entries.iter_mut().find(|e| e.name.eq_ignore_ascii_case(name)) {
            Some(entry) => entry.values.push(value.to_string()),
            None => self.entries.push(HeaderEntry {
                name: name.to_string(),
                values: vec![value.to_string()],
            }),
        }
        Ok(())
    }

    /// Builder-style [`try_append`](Self::try_append).
    pub fn with(mut self, name: &str, value: &str) -> Result<Self, HeaderError> {
        self.try_append(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&HeaderEntry> {
        self.entries.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeaderEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a HeaderFields {
    type Item = &'a HeaderEntry;
    type IntoIter = std::slice::Iter<'a, HeaderEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
