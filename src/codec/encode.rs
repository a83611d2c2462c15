//! Request → datagram.
//!
//! # Responsibilities
//! - Write the request line, a synthesized `Host` when missing, all headers
//!   and the blank line into a caller-owned buffer
//! - Copy the body after the header block
//! - Fail with [`CodecError::TooLarge`] instead of growing or truncating
//!
//! # Design Decisions
//! - The head is written synchronously; only body frames are awaited
//! - Once the buffer is full the body is polled once more, so a body that
//!   still has data is rejected rather than cut short

use std::pin::pin;

use bytes::Buf;
use http_body::Body;
use http_body_util::BodyExt;
use thiserror::Error;
use url::Url;

use crate::codec::headers::HeaderFields;
use crate::codec::request::{RequestHead, WireRequest};
use crate::codec::{BoxError, CRLF, MAX_DATAGRAM_SIZE};

const SPACE: &[u8] = b" ";
const COLON_SPACE: &[u8] = b": ";
const HTTP_VERSION_PREFIX: &[u8] = b"HTTP/";
const HOST_PREFIX: &[u8] = b"Host: ";
const CONTENT_LENGTH_PREFIX: &[u8] = b"Content-Length: ";

/// Errors produced while encoding a request.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The request cannot be expressed on the wire (missing or relative URI).
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    /// Header block plus body do not fit in one datagram.
    #[error("message exceeds {} bytes", MAX_DATAGRAM_SIZE)]
    TooLarge,

    /// The body source failed while being read.
    #[error("request body could not be read: {0}")]
    Unreadable(#[source] BoxError),
}

/// Bounded cursor over the destination buffer.
struct HeadWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> HeadWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let end = self
            .pos
            .checked_add(bytes.len())
            .filter(|&end| end <= self.buf.len())
            .ok_or(CodecError::TooLarge)?;
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn put_fields(&mut self, fields: &HeaderFields) -> Result<(), CodecError> {
        for entry in fields {
            self.put(entry.name().as_bytes())?;
            self.put(COLON_SPACE)?;
            for (i, value) in entry.values().iter().enumerate() {
                if i > 0 {
                    self.put(entry.separator().as_bytes())?;
                }
                self.put(value.as_bytes())?;
            }
            self.put(CRLF)?;
        }
        Ok(())
    }
}

/// `host[:port]`, leaving out the scheme's default port.
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Write the header block (request line through the blank line).
///
/// `content_length` is the body length when it is known up front; it is
/// written as `Content-Length` unless the caller already set one.
pub fn encode_head(
    head: &RequestHead,
    content_length: Option<u64>,
    buf: &mut [u8],
) -> Result<usize, CodecError> {
    if head.uri().is_empty() {
        return Err(CodecError::InvalidRequest("request has no uri"));
    }
    // Url::parse strips tabs and line breaks, but the raw text is what goes
    // on the request line.
    if head.uri().bytes().any(|b| b <= b' ' || b == 0x7f) {
        return Err(CodecError::InvalidRequest("request uri contains whitespace or control bytes"));
    }
    let url = Url::parse(head.uri())
        .map_err(|_| CodecError::InvalidRequest("request uri must be absolute"))?;

    let mut w = HeadWriter::new(buf);

    w.put(head.method().as_str().as_bytes())?;
    w.put(SPACE)?;
    w.put(head.uri().as_bytes())?;
    w.put(SPACE)?;
    w.put(HTTP_VERSION_PREFIX)?;
    w.put(head.version().to_string().as_bytes())?;
    w.put(CRLF)?;

    if !head.headers().contains("Host") {
        let authority = authority(&url)
            .ok_or(CodecError::InvalidRequest("request uri has no authority for a Host header"))?;
        w.put(HOST_PREFIX)?;
        w.put(authority.as_bytes())?;
        w.put(CRLF)?;
    }

    w.put_fields(head.headers())?;
    w.put_fields(head.content_headers())?;

    if let Some(len) = content_length {
        if !head.content_headers().contains("Content-Length") {
            w.put(CONTENT_LENGTH_PREFIX)?;
            w.put(len.to_string().as_bytes())?;
            w.put(CRLF)?;
        }
    }

    w.put(CRLF)?;
    Ok(w.pos)
}

/// Drain `body` into `buf`, returning the number of body bytes written.
///
/// Trailers are not carried. After the buffer has been filled exactly, the
/// next non-empty data frame makes this fail with [`CodecError::TooLarge`].
pub async fn encode_body<B>(body: B, buf: &mut [u8]) -> Result<usize, CodecError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let mut body = pin!(body);
    let mut written = 0;

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| CodecError::Unreadable(e.into()))?;
        let Ok(mut data) = frame.into_data() else {
            continue;
        };

        let len = data.remaining();
        if len == 0 {
            continue;
        }
        let end = written + len;
        if end > buf.len() {
            return Err(CodecError::TooLarge);
        }
        data.copy_to_slice(&mut buf[written..end]);
        written = end;
    }

    Ok(written)
}

/// Encode `head` and an optional streaming body into `buf`.
///
/// Returns the total number of bytes to transmit.
pub async fn encode<B>(head: &RequestHead, body: Option<B>, buf: &mut [u8]) -> Result<usize, CodecError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let content_length = body
        .as_ref()
        .and_then(|b| b.size_hint().exact())
        .filter(|&len| len > 0);
    let head_len = encode_head(head, content_length, buf)?;

    let body_len = match body {
        Some(body) => encode_body(body, &mut buf[head_len..]).await?,
        None => 0,
    };
    Ok(head_len + body_len)
}

/// Encode a request whose body is already in memory.
pub fn encode_request(request: &WireRequest, buf: &mut [u8]) -> Result<usize, CodecError> {
    let body = request.body();
    let head_len = encode_head(request.head(), body.map(|b| b.len() as u64), buf)?;

    let Some(body) = body else {
        return Ok(head_len);
    };
    let end = head_len
        .checked_add(body.len())
        .filter(|&end| end <= buf.len())
        .ok_or(CodecError::TooLarge)?;
    buf[head_len..end].copy_from_slice(body);
    Ok(end)
}
