//! Sender → datagram → receiver → delivery, over loopback.

use std::time::Duration;

use bytes::Bytes;
use http::{Method, Request, StatusCode};
use http_body_util::Full;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use udp_http_gateway::codec::{CodecError, RequestHead, WireRequest};
use udp_http_gateway::config::ForwarderConfig;
use udp_http_gateway::{GatewaySender, HttpForwarder, ReceiverError, SendError, UdpGatewayService, UdpReceiver};

mod common;

#[tokio::test]
async fn post_body_arrives_intact() {
    let (delivery, mut rx) = common::RecordingDelivery::new();
    let receiver = common::start_receiver(delivery).await;

    let mut sender = GatewaySender::connect(receiver.addr).await.unwrap();
    let head = RequestHead::new(Method::POST, "http://127.0.0.1:9080/items")
        .header("Content-Type", "application/octet-stream")
        .unwrap();
    let request = WireRequest::new(head).with_body(vec![1u8, 2, 3, 4, 5]);
    sender.send_request(&request, &CancellationToken::new()).await.unwrap();

    let received = common::next_request(&mut rx).await;
    assert_eq!(received.method(), Method::POST);
    assert_eq!(received.uri(), "http://127.0.0.1:9080/items");
    assert_eq!(received.headers().get("Host").unwrap().values(), ["127.0.0.1:9080"]);
    assert_eq!(received.content_headers().get("Content-Length").unwrap().values(), ["5"]);
    assert_eq!(
        received.content_headers().get("Content-Type").unwrap().values(),
        ["application/octet-stream"]
    );
    assert_eq!(&received.body().unwrap()[..], &[1u8, 2, 3, 4, 5][..]);

    let stats = receiver.stop().await;
    assert_eq!(stats.datagrams, 1);
    assert_eq!(stats.delivered, 1);
}

#[tokio::test]
async fn adapter_request_reaches_http_destination() {
    let (destination, mut captured) = common::start_destination().await;
    let forwarder = HttpForwarder::new(&ForwarderConfig {
        connect_timeout_secs: 2,
        request_timeout_secs: 5,
    });
    let receiver = common::start_receiver(forwarder).await;

    let service = UdpGatewayService::new(receiver.addr);
    let request = Request::builder()
        .method(Method::PUT)
        .uri(format!("http://{destination}/things/7?verbose=1"))
        .header("user-agent", "probe/1.0")
        .header("x-trace", "abc")
        .header("content-type", "text/plain")
        .body(Full::new(Bytes::from_static(b"hello")))
        .unwrap();

    let response = service.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let seen = tokio::time::timeout(Duration::from_secs(5), captured.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seen.method, Method::PUT);
    assert_eq!(seen.uri, "/things/7?verbose=1");
    assert_eq!(seen.headers["user-agent"], "probe/1.0");
    assert_eq!(seen.headers["x-trace"], "abc");
    assert_eq!(seen.headers["content-type"], "text/plain");
    assert_eq!(seen.headers["host"], destination.to_string());
    assert_eq!(&seen.body[..], b"hello");

    let stats = receiver.stop().await;
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.delivery_failures, 0);
}

#[tokio::test]
async fn garbage_and_failed_deliveries_do_not_stop_the_loop() {
    let (delivery, mut rx) = common::FlakyDelivery::new();
    let receiver = common::start_receiver(delivery).await;

    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.send_to(b"\x00\x01 not http at all", receiver.addr).await.unwrap();
    socket
        .send_to(b"GET http://h/fail HTTP/1.1\r\nHost: h\r\n\r\n", receiver.addr)
        .await
        .unwrap();
    socket
        .send_to(b"GET http://h/ok HTTP/1.1\r\nHost: h\r\n\r\n", receiver.addr)
        .await
        .unwrap();

    let received = common::next_request(&mut rx).await;
    assert_eq!(received.uri(), "http://h/ok");

    let stats = receiver.stop().await;
    assert_eq!(stats.datagrams, 3);
    assert_eq!(stats.decode_failures, 1);
    assert_eq!(stats.delivery_failures, 1);
    assert_eq!(stats.delivered, 1);
}

#[tokio::test]
async fn oversized_request_is_never_transmitted() {
    let (delivery, mut rx) = common::RecordingDelivery::new();
    let receiver = common::start_receiver(delivery).await;

    let mut sender = GatewaySender::connect(receiver.addr).await.unwrap();
    let head = RequestHead::new(Method::POST, "http://h/upload");
    let request = WireRequest::new(head).with_body(vec![0u8; 70_000]);
    let result = sender.send_request(&request, &CancellationToken::new()).await;
    assert!(matches!(result, Err(SendError::Codec(CodecError::TooLarge))));

    assert!(tokio::time::timeout(Duration::from_millis(200), rx.recv()).await.is_err());
    assert_eq!(receiver.stop().await.datagrams, 0);
}

#[tokio::test]
async fn cancelled_send_transmits_nothing() {
    let (delivery, mut rx) = common::RecordingDelivery::new();
    let receiver = common::start_receiver(delivery).await;

    let mut sender = GatewaySender::connect(receiver.addr).await.unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let request = WireRequest::new(RequestHead::new(Method::GET, "http://h/"));
    let result = sender.send_request(&request, &cancel).await;
    assert!(matches!(result, Err(SendError::Cancelled)));

    assert!(tokio::time::timeout(Duration::from_millis(200), rx.recv()).await.is_err());
    receiver.stop().await;
}

#[tokio::test]
async fn binding_a_taken_port_fails() {
    let taken = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let endpoint = taken.local_addr().unwrap().to_string();

    let (delivery, _rx) = common::RecordingDelivery::new();
    let result = UdpReceiver::bind(&endpoint, delivery).await;
    assert!(matches!(result, Err(ReceiverError::Bind { .. })));
}
