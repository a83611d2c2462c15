//! Datagram → request.
//!
//! Malformed input is expected on an open UDP port, so decoding reports
//! failure as `None` and never panics.

use bytes::Bytes;
use http::Method;
use memchr::memmem;

use crate::codec::request::{HttpVersion, RequestHead, WireRequest};
use crate::codec::CRLF;

const DOUBLE_CRLF: &[u8] = b"\r\n\r\n";
const COLON_SPACE: &str = ": ";

/// Split off the text before `separator`. The token must not be empty.
fn next_token<'a>(s: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    let (token, rest) = s.split_once(separator)?;
    (!token.is_empty()).then_some((token, rest))
}

fn parse_request_line(line: &str) -> Option<RequestHead> {
    let (method, rest) = next_token(line, " ")?;
    let (uri, rest) = next_token(rest, " ")?;
    let (protocol, version) = next_token(rest, "/")?;
    if protocol != "HTTP" {
        return None;
    }

    let method = Method::from_bytes(method.as_bytes()).ok()?;
    let version: HttpVersion = version.parse().ok()?;
    Some(RequestHead::new(method, uri).with_version(version))
}

/// Decode one datagram.
///
/// Returns `None` if the request line is malformed, the header block is not
/// terminated within the datagram, or any header line is rejected by both
/// header mappings.
pub fn decode(datagram: &[u8]) -> Option<WireRequest> {
    let line_end = memmem::find(datagram, CRLF)?;
    if line_end == 0 {
        return None;
    }
    let request_line = std::str::from_utf8(&datagram[..line_end]).ok()?;
    let mut head = parse_request_line(request_line)?;

    // Searching from the request line's own CRLF lets a request with no
    // header lines terminate the block.
    let terminator = line_end + memmem::find(&datagram[line_end..], DOUBLE_CRLF)?;
    let body = &datagram[terminator + DOUBLE_CRLF.len()..];

    let mut lines = &datagram[line_end + CRLF.len()..terminator + CRLF.len()];
    while let Some(end) = memmem::find(lines, CRLF) {
        // An empty line ends scanning.
        if end == 0 {
            break;
        }
        let line = std::str::from_utf8(&lines[..end]).ok()?;
        lines = &lines[end + CRLF.len()..];

        let (name, value) = next_token(line, COLON_SPACE)?;
        if value.is_empty() {
            return None;
        }
        if head.headers_mut().try_append(name, value).is_err() {
            head.content_headers_mut().try_append(name, value).ok()?;
        }
    }

    let request = WireRequest::new(head);
    Some(if body.is_empty() {
        request
    } else {
        request.with_body(Bytes::copy_from_slice(body))
    })
}
