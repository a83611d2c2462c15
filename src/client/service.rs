//! `tower::Service` adapter that sends HTTP requests through the gateway.
//!
//! The gateway is one-way: the response returned here is always a synthetic
//! `200 OK` with an empty body. It only means the datagram was handed to the
//! socket; it says nothing about whether the destination ever saw the
//! request. Encoding and socket errors are returned as the service error.
//!
//! A [`CancellationToken`] placed in the request extensions is honored.
//! Dropping the response future also abandons the send.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http::request::Parts;
use http::{Request, Response};
use http_body::Body;
use http_body_util::Empty;
use tokio_util::sync::CancellationToken;
use tower::Service;

use crate::client::pool::SenderPool;
use crate::client::sender::SendError;
use crate::codec::{BoxError, CodecError, HttpVersion, RequestHead};

/// Sends each request as one datagram and answers `200 OK`.
#[derive(Debug, Clone)]
pub struct UdpGatewayService {
    pool: SenderPool,
}

impl UdpGatewayService {
    pub fn new(gateway: SocketAddr) -> Self {
        Self::from_pool(SenderPool::new(gateway))
    }

    pub fn from_pool(pool: SenderPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SenderPool {
        &self.pool
    }
}

/// Title-case a lowercase header name the way hyper writes it on HTTP/1
/// with `title_case_headers`: `user-agent` becomes `User-Agent`.
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        upper = c == '-';
    }
    out
}

/// Convert request parts to a wire head, routing content headers to the
/// content mapping.
pub fn head_from_parts(parts: &Parts) -> Result<RequestHead, CodecError> {
    let mut head = RequestHead::new(parts.method.clone(), parts.uri.to_string())
        .with_version(HttpVersion::from(parts.version));

    for (name, value) in &parts.headers {
        let value = value
            .to_str()
            .map_err(|_| CodecError::InvalidRequest("header value is not visible ascii"))?;
        head.append_header(&title_case(name.as_str()), value)
            .map_err(|_| CodecError::InvalidRequest("header cannot be sent through the gateway"))?;
    }
    Ok(head)
}

impl<B> Service<Request<B>> for UdpGatewayService
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = Response<Empty<Bytes>>;
    type Error = SendError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let pool = self.pool.clone();
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let cancel = parts
                .extensions
                .get::<CancellationToken>()
                .cloned()
                .unwrap_or_default();
            let head = head_from_parts(&parts)?;
            let body = (!body.is_end_stream()).then_some(body);

            pool.send(&head, body, &cancel).await?;
            Ok(Response::new(Empty::new()))
        })
    }
}
