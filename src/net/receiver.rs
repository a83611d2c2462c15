//! UDP receive loop.
//!
//! # Responsibilities
//! - Resolve and bind the configured endpoint
//! - Receive datagrams, decode them and hand them to a [`Deliver`]
//! - Survive malformed datagrams, failed deliveries and transient socket faults
//! - Report counters when the loop ends

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::codec::{decode, DatagramBuffer};
use crate::delivery::Deliver;
use crate::observability::metrics;

/// Error type for receiver operations.
#[derive(Debug, Error)]
pub enum ReceiverError {
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("no usable address for {0}")]
    NoAddress(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to receive: {0}")]
    Receive(#[source] io::Error),
}

/// Counters for one run of the receive loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    pub datagrams: u64,
    pub bytes: u64,
    pub decode_failures: u64,
    pub delivered: u64,
    pub delivery_failures: u64,
}

/// Logs the final counters exactly once, whichever way the loop exits.
struct StatsGuard {
    local_addr: Option<SocketAddr>,
    stats: ReceiverStats,
}

impl Drop for StatsGuard {
    fn drop(&mut self) {
        let address = self
            .local_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        tracing::info!(
            address = %address,
            datagrams = self.stats.datagrams,
            bytes = self.stats.bytes,
            decode_failures = self.stats.decode_failures,
            delivered = self.stats.delivered,
            delivery_failures = self.stats.delivery_failures,
            "Receiver stopped"
        );
    }
}

/// Socket faults that only affect one receive.
///
/// On some platforms an ICMP port-unreachable from an earlier send surfaces
/// as `ConnectionReset` on the next receive.
fn is_recoverable(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}

/// Receives wire-format datagrams and delivers them one at a time.
pub struct UdpReceiver<D> {
    socket: UdpSocket,
    buffer: DatagramBuffer,
    delivery: D,
}

impl<D: Deliver> UdpReceiver<D> {
    /// Resolve `endpoint` and bind to the first address that works.
    pub async fn bind(endpoint: &str, delivery: D) -> Result<Self, ReceiverError> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(endpoint)
            .await
            .map_err(|source| ReceiverError::Resolve {
                endpoint: endpoint.to_string(),
                source,
            })?
            .collect();

        tracing::info!(endpoint, addresses = ?addrs, "Resolved receiver endpoint");

        let mut last_error = None;
        for addr in addrs {
            match UdpSocket::bind(addr).await {
                Ok(socket) => {
                    let local_addr = socket
                        .local_addr()
                        .map_err(|source| ReceiverError::Bind { addr, source })?;
                    tracing::info!(address = %local_addr, "Listening for datagrams");
                    return Ok(Self {
                        socket,
                        buffer: DatagramBuffer::new(),
                        delivery,
                    });
                }
                Err(source) => {
                    tracing::debug!(address = %addr, error = %source, "Bind attempt failed");
                    last_error = Some(ReceiverError::Bind { addr, source });
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ReceiverError::NoAddress(endpoint.to_string())))
    }

    /// Get the local address this receiver is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Run until `shutdown` is cancelled or the socket fails.
    ///
    /// A delivery already in progress finishes before cancellation is
    /// observed.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<ReceiverStats, ReceiverError> {
        let mut guard = StatsGuard {
            local_addr: self.socket.local_addr().ok(),
            stats: ReceiverStats::default(),
        };

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let received = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                received = self.socket.recv_from(&mut self.buffer[..]) => received,
            };

            let (len, peer) = match received {
                Ok(received) => received,
                Err(e) if is_recoverable(&e) => {
                    tracing::debug!(error = %e, "Ignoring transient receive error");
                    continue;
                }
                Err(e) => return Err(ReceiverError::Receive(e)),
            };

            guard.stats.datagrams += 1;
            guard.stats.bytes += len as u64;
            metrics::record_datagram_received(len);

            let Some(request) = decode(&self.buffer[..len]) else {
                guard.stats.decode_failures += 1;
                metrics::record_decode_failure();
                tracing::debug!(peer_addr = %peer, len, "Dropping undecodable datagram");
                continue;
            };

            let method = request.method().clone();
            let uri = request.uri().to_string();
            match self.delivery.deliver(request).await {
                Ok(status) => {
                    guard.stats.delivered += 1;
                    metrics::record_delivery(true);
                    tracing::debug!(peer_addr = %peer, %method, %uri, status = status.as_u16(), "Delivered");
                }
                Err(e) => {
                    guard.stats.delivery_failures += 1;
                    metrics::record_delivery(false);
                    tracing::warn!(peer_addr = %peer, %method, %uri, error = %e, "Delivery failed");
                }
            }
        }

        Ok(guard.stats)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use http::StatusCode;

    use super::*;
    use crate::codec::WireRequest;
    use crate::delivery::DeliveryError;

    #[derive(Default, Clone)]
    struct Collect(Arc<Mutex<Vec<String>>>);

    impl Deliver for Collect {
        async fn deliver(&self, request: WireRequest) -> Result<StatusCode, DeliveryError> {
            self.0.lock().unwrap().push(request.uri().to_string());
            Ok(StatusCode::OK)
        }
    }

    #[test]
    fn classifies_transient_errors() {
        assert!(is_recoverable(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(is_recoverable(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(!is_recoverable(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }

    #[tokio::test]
    async fn unresolvable_endpoint_is_an_error() {
        let result = UdpReceiver::bind("not-an-endpoint", Collect::default()).await;
        assert!(matches!(result, Err(ReceiverError::Resolve { .. })));
    }

    #[tokio::test]
    async fn delivers_in_arrival_order_and_stops_on_cancel() {
        let seen = Collect::default();
        let receiver = UdpReceiver::bind("127.0.0.1:0", seen.clone()).await.unwrap();
        let addr = receiver.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(receiver.run(shutdown.clone()));

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        for n in 0..3 {
            let datagram = format!("GET http://h/{n} HTTP/1.1\r\nHost: h\r\n\r\n");
            client.send_to(datagram.as_bytes(), addr).await.unwrap();
        }
        client.send_to(b"garbage", addr).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            while seen.0.lock().unwrap().len() < 3 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        shutdown.cancel();
        let stats = task.await.unwrap().unwrap();
        assert_eq!(*seen.0.lock().unwrap(), vec!["http://h/0", "http://h/1", "http://h/2"]);
        assert_eq!(stats.datagrams, 4);
        assert_eq!(stats.decode_failures, 1);
        assert_eq!(stats.delivered, 3);
    }

    #[tokio::test]
    async fn cancelled_before_start_returns_empty_stats() {
        let receiver = UdpReceiver::bind("127.0.0.1:0", Collect::default()).await.unwrap();
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        assert_eq!(receiver.run(shutdown).await.unwrap(), ReceiverStats::default());
    }
}
