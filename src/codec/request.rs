//! The request carried end to end through the gateway.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use http::Method;

use crate::codec::headers::{HeaderError, HeaderFields};

/// Protocol version written on the request line (`HTTP/<major>.<minor>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpVersion {
    pub major: u16,
    pub minor: u16,
}

impl HttpVersion {
    pub const HTTP_10: HttpVersion = HttpVersion { major: 1, minor: 0 };
    pub const HTTP_11: HttpVersion = HttpVersion { major: 1, minor: 1 };

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl Default for HttpVersion {
    fn default() -> Self {
        Self::HTTP_11
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error returned when a version is not `<digits>.<digits>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid http version {0:?}")]
pub struct InvalidVersion(String);

impl FromStr for HttpVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_part = |part: &str| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            part.parse::<u16>().ok()
        };

        s.split_once('.')
            .and_then(|(major, minor)| Some(Self::new(parse_part(major)?, parse_part(minor)?)))
            .ok_or_else(|| InvalidVersion(s.to_string()))
    }
}

impl From<http::Version> for HttpVersion {
    fn from(version: http::Version) -> Self {
        match version {
            http::Version::HTTP_09 => Self::new(0, 9),
            http::Version::HTTP_10 => Self::HTTP_10,
            http::Version::HTTP_2 => Self::new(2, 0),
            http::Version::HTTP_3 => Self::new(3, 0),
            _ => Self::HTTP_11,
        }
    }
}

/// Everything on the wire before the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    method: Method,
    uri: String,
    version: HttpVersion,
    headers: HeaderFields,
    content_headers: HeaderFields,
}

impl RequestHead {
    /// Create a head with no headers. The URI is kept exactly as given.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            version: HttpVersion::default(),
            headers: HeaderFields::request(),
            content_headers: HeaderFields::content(),
        }
    }

    pub fn with_version(mut self, version: HttpVersion) -> Self {
        self.version = version;
        self
    }

    /// Add a header, routing content headers to the content mapping.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, HeaderError> {
        self.append_header(name, value)?;
        Ok(self)
    }

    /// Append to the request mapping, falling back to the content mapping.
    pub fn append_header(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        match self.headers.try_append(name, value) {
            Ok(()) => Ok(()),
            Err(HeaderError::WrongKind { .. }) => self.content_headers.try_append(name, value),
            Err(e) => Err(e),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn headers(&self) -> &HeaderFields {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderFields {
        &mut self.headers
    }

    pub fn content_headers(&self) -> &HeaderFields {
        &self.content_headers
    }

    pub fn content_headers_mut(&mut self) -> &mut HeaderFields {
        &mut self.content_headers
    }
}

/// A request with its body fully buffered.
///
/// This is what [`decode`](crate::codec::decode) produces and what the
/// receiver hands to delivery. It can also be sent directly with
/// [`GatewaySender::send_request`](crate::client::GatewaySender::send_request).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    head: RequestHead,
    body: Option<Bytes>,
}

impl WireRequest {
    pub fn new(head: RequestHead) -> Self {
        Self { head, body: None }
    }

    /// Attach a body. An empty body is the same as no body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.body = (!body.is_empty()).then_some(body);
        self
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn method(&self) -> &Method {
        self.head.method()
    }

    pub fn uri(&self) -> &str {
        self.head.uri()
    }

    pub fn version(&self) -> HttpVersion {
        self.head.version()
    }

    pub fn headers(&self) -> &HeaderFields {
        self.head.headers()
    }

    pub fn content_headers(&self) -> &HeaderFields {
        self.head.content_headers()
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn into_parts(self) -> (RequestHead, Option<Bytes>) {
        (self.head, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parses_two_part_numbers() {
        assert_eq!("1.1".parse::<HttpVersion>().unwrap(), HttpVersion::HTTP_11);
        assert_eq!("2.0".parse::<HttpVersion>().unwrap(), HttpVersion::new(2, 0));
        assert_eq!(HttpVersion::new(1, 0).to_string(), "1.0");
    }

    #[test]
    fn version_rejects_malformed_input() {
        for bad in ["", "1", "1.", ".1", "1.1.1", "a.b", "+1.1", "1.-1", "99999.1"] {
            assert!(bad.parse::<HttpVersion>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn header_routes_content_headers() {
        let head = RequestHead::new(Method::POST, "http://example.com/")
            .header("Content-Type", "text/plain")
            .unwrap()
            .header("X-Id", "7")
            .unwrap();

        assert!(head.headers().contains("x-id"));
        assert!(!head.headers().contains("content-type"));
        assert!(head.content_headers().contains("content-type"));
    }

    #[test]
    fn empty_body_is_no_body() {
        let head = RequestHead::new(Method::POST, "http://example.com/");
        assert!(WireRequest::new(head.clone()).with_body(Bytes::new()).body().is_none());
        assert_eq!(WireRequest::new(head).with_body(&b"x"[..]).body().unwrap().len(), 1);
    }
}
