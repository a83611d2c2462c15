//! Wire codec subsystem.
//!
//! # Data Flow
//! ```text
//! RequestHead + body
//!     → encode.rs (request line, Host, headers, blank line, body)
//!     → datagram bytes (≤ 65536)
//!     → decode.rs (request line, header block, body)
//!     → WireRequest
//! ```
//!
//! # Wire Format
//! ```text
//! <METHOD> <URI> HTTP/<major>.<minor>\r\n
//! [Host: <authority>\r\n]                 only if the caller set no Host
//! <Header-Name>: <value[,value...]>\r\n   ' ' joins values iff name == "User-Agent"
//! ...
//! \r\n
//! [<body bytes>]
//! ```
//!
//! # Design Decisions
//! - No I/O: callers own the buffer and the socket
//! - Encoding never grows the buffer; oversize is an error
//! - Decoding failures are `None`, not errors
//! - Cookie headers are not special-cased

pub mod decode;
pub mod encode;
pub mod headers;
pub mod request;

pub use decode::decode;
pub use encode::{encode, encode_body, encode_head, encode_request, CodecError};
pub use headers::{HeaderEntry, HeaderError, HeaderFields, HeaderKind};
pub use request::{HttpVersion, RequestHead, WireRequest};

/// Largest datagram the gateway sends or receives.
pub const MAX_DATAGRAM_SIZE: usize = 0x10000;

pub(crate) const CRLF: &[u8] = b"\r\n";

/// Boxed error used for body sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fixed-size buffer owned by one sender or receiver and reused per message.
pub struct DatagramBuffer(Box<[u8]>);

impl DatagramBuffer {
    pub fn new() -> Self {
        Self(vec![0u8; MAX_DATAGRAM_SIZE].into_boxed_slice())
    }
}

impl Default for DatagramBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DatagramBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatagramBuffer").field("capacity", &self.0.len()).finish()
    }
}

impl std::ops::Deref for DatagramBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl std::ops::DerefMut for DatagramBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}
