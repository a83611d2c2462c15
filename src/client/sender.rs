//! Single-flight datagram sender.
//!
//! # Responsibilities
//! - Own one datagram buffer and one UDP socket aimed at a fixed gateway
//! - Encode a request into the buffer and transmit it as one datagram
//! - Abandon the body read or the transmit when cancelled
//!
//! # Design Decisions
//! - `send` takes `&mut self`: the buffer is reused, so one instance can only
//!   have one send in flight. Use [`SenderPool`](crate::client::SenderPool)
//!   for concurrency.
//! - Nothing is transmitted unless the whole request was encoded

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use http_body::Body;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::codec::{self, BoxError, CodecError, DatagramBuffer, RequestHead, WireRequest};
use crate::observability::metrics;

/// Errors returned by a send.
#[derive(Debug, Error)]
pub enum SendError {
    /// The request could not be encoded (invalid, too large, unreadable body).
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Socket or network failure.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The cancellation token fired before the datagram was sent.
    #[error("send cancelled")]
    Cancelled,
}

impl SendError {
    fn outcome(&self) -> &'static str {
        match self {
            SendError::Codec(CodecError::InvalidRequest(_)) => "invalid_request",
            SendError::Codec(CodecError::TooLarge) => "too_large",
            SendError::Codec(CodecError::Unreadable(_)) => "unreadable",
            SendError::Transport(_) => "transport_error",
            SendError::Cancelled => "cancelled",
        }
    }
}

/// Sends requests to one gateway, one at a time.
#[derive(Debug)]
pub struct GatewaySender {
    socket: UdpSocket,
    destination: SocketAddr,
    buffer: DatagramBuffer,
}

impl GatewaySender {
    /// Bind an ephemeral local socket of the destination's address family.
    pub async fn connect(destination: SocketAddr) -> Result<Self, SendError> {
        let local: SocketAddr = if destination.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;

        tracing::debug!(
            local_addr = ?socket.local_addr().ok(),
            destination = %destination,
            "Gateway sender bound"
        );

        Ok(Self {
            socket,
            destination,
            buffer: DatagramBuffer::new(),
        })
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Encode `head` and `body` and send them as one datagram.
    ///
    /// Returns the number of bytes sent.
    pub async fn send<B>(
        &mut self,
        head: &RequestHead,
        body: Option<B>,
        cancel: &CancellationToken,
    ) -> Result<usize, SendError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let result = async {
            let len = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SendError::Cancelled),
                encoded = codec::encode(head, body, &mut self.buffer) => encoded?,
            };
            self.transmit(len, cancel).await
        }
        .await;

        self.record(&result);
        result
    }

    /// Send a request whose body is already buffered.
    pub async fn send_request(
        &mut self,
        request: &WireRequest,
        cancel: &CancellationToken,
    ) -> Result<usize, SendError> {
        let result = async {
            if cancel.is_cancelled() {
                return Err(SendError::Cancelled);
            }
            let len = codec::encode_request(request, &mut self.buffer)?;
            self.transmit(len, cancel).await
        }
        .await;

        self.record(&result);
        result
    }

    async fn transmit(&self, len: usize, cancel: &CancellationToken) -> Result<usize, SendError> {
        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SendError::Cancelled),
            sent = self.socket.send_to(&self.buffer[..len], self.destination) => sent?,
        };

        tracing::trace!(destination = %self.destination, bytes = sent, "Datagram sent");
        Ok(sent)
    }

    fn record(&self, result: &Result<usize, SendError>) {
        match result {
            Ok(_) => metrics::record_send("ok"),
            Err(e) => {
                tracing::debug!(destination = %self.destination, error = %e, "Send failed");
                metrics::record_send(e.outcome());
            }
        }
    }
}
