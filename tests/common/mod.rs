//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::Router;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use udp_http_gateway::codec::WireRequest;
use udp_http_gateway::{Deliver, DeliveryError, ReceiverError, ReceiverStats, UdpReceiver};

/// Delivery that hands every decoded request to a channel.
#[derive(Clone)]
pub struct RecordingDelivery {
    tx: mpsc::UnboundedSender<WireRequest>,
}

impl RecordingDelivery {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WireRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Deliver for RecordingDelivery {
    async fn deliver(&self, request: WireRequest) -> Result<StatusCode, DeliveryError> {
        let _ = self.tx.send(request);
        Ok(StatusCode::OK)
    }
}

/// Records like [`RecordingDelivery`] but fails any request whose URI
/// contains `/fail`.
#[derive(Clone)]
pub struct FlakyDelivery {
    inner: RecordingDelivery,
}

impl FlakyDelivery {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WireRequest>) {
        let (inner, rx) = RecordingDelivery::new();
        (Self { inner }, rx)
    }
}

impl Deliver for FlakyDelivery {
    async fn deliver(&self, request: WireRequest) -> Result<StatusCode, DeliveryError> {
        if request.uri().contains("/fail") {
            return Err(DeliveryError::InvalidRequest("destination refused".into()));
        }
        self.inner.deliver(request).await
    }
}

pub struct RunningReceiver {
    pub addr: SocketAddr,
    pub shutdown: CancellationToken,
    pub handle: JoinHandle<Result<ReceiverStats, ReceiverError>>,
}

impl RunningReceiver {
    pub async fn stop(self) -> ReceiverStats {
        self.shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("receiver did not stop")
            .expect("receiver task panicked")
            .expect("receiver failed")
    }
}

/// Bind a receiver on an ephemeral loopback port and run it in the background.
pub async fn start_receiver<D: Deliver + 'static>(delivery: D) -> RunningReceiver {
    let receiver = UdpReceiver::bind("127.0.0.1:0", delivery).await.unwrap();
    let addr = receiver.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(receiver.run(shutdown.clone()));
    RunningReceiver { addr, shutdown, handle }
}

/// Receive the next delivered request, failing after a few seconds.
pub async fn next_request(rx: &mut mpsc::UnboundedReceiver<WireRequest>) -> WireRequest {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no request delivered in time")
        .expect("delivery channel closed")
}

/// A request as seen by the fake HTTP destination.
#[derive(Debug)]
pub struct CapturedRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

async fn capture(State(tx): State<mpsc::UnboundedSender<CapturedRequest>>, request: Request<Body>) -> StatusCode {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let _ = tx.send(CapturedRequest {
        method: parts.method,
        uri: parts.uri.to_string(),
        headers: parts.headers,
        body,
    });
    StatusCode::NO_CONTENT
}

/// Start an HTTP server that records every request it gets.
pub async fn start_destination() -> (SocketAddr, mpsc::UnboundedReceiver<CapturedRequest>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new().fallback(capture).with_state(tx);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, rx)
}
