//! HTTP forwarding of decoded requests.
//!
//! # Responsibilities
//! - Turn a [`WireRequest`] back into an `http::Request`
//! - Send it with a pooled hyper client under a request timeout
//! - Report the response status
//!
//! # Design Decisions
//! - Relative URIs are resolved against the request's `Host` header
//! - Anything other than HTTP/1.0 is forwarded as HTTP/1.1 (the connector
//!   only speaks HTTP/1)

use std::time::Duration;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Request, StatusCode, Uri, Version};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::codec::{HttpVersion, WireRequest};
use crate::config::ForwarderConfig;
use crate::delivery::{Deliver, DeliveryError};

/// Forwards requests over HTTP/1 with hyper-util's pooled client.
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: Client<HttpConnector, Full<Bytes>>,
    request_timeout: Duration,
}

impl HttpForwarder {
    pub fn new(config: &ForwarderConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

fn target_uri(request: &WireRequest) -> Result<Uri, DeliveryError> {
    let uri: Uri = request
        .uri()
        .parse()
        .map_err(|e| DeliveryError::InvalidRequest(format!("invalid uri {:?}: {e}", request.uri())))?;
    if uri.scheme().is_some() && uri.authority().is_some() {
        return Ok(uri);
    }

    let host = request
        .headers()
        .get("Host")
        .and_then(|entry| entry.values().first())
        .ok_or_else(|| DeliveryError::InvalidRequest("relative uri without a Host header".into()))?;
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    format!("http://{host}{path}")
        .parse()
        .map_err(|e| DeliveryError::InvalidRequest(format!("cannot resolve relative uri: {e}")))
}

/// Build the outbound HTTP request.
pub fn to_http_request(request: WireRequest) -> Result<Request<Full<Bytes>>, DeliveryError> {
    let uri = target_uri(&request)?;
    let version = if request.version() == HttpVersion::HTTP_10 {
        Version::HTTP_10
    } else {
        Version::HTTP_11
    };

    let mut builder = Request::builder()
        .method(request.method().clone())
        .uri(uri)
        .version(version);

    if let Some(headers) = builder.headers_mut() {
        for entry in request.headers().iter().chain(request.content_headers().iter()) {
            let name = HeaderName::from_bytes(entry.name().as_bytes())
                .map_err(|e| DeliveryError::InvalidRequest(format!("header {:?}: {e}", entry.name())))?;
            for value in entry.values() {
                let value = HeaderValue::from_str(value)
                    .map_err(|e| DeliveryError::InvalidRequest(format!("header {:?}: {e}", entry.name())))?;
                headers.append(name.clone(), value);
            }
        }
    }

    let (_, body) = request.into_parts();
    builder
        .body(Full::new(body.unwrap_or_default()))
        .map_err(|e| DeliveryError::InvalidRequest(e.to_string()))
}

impl Deliver for HttpForwarder {
    async fn deliver(&self, request: WireRequest) -> Result<StatusCode, DeliveryError> {
        let request = to_http_request(request)?;

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| DeliveryError::Upstream(Box::new(e)))?;
            let status = response.status();
            response
                .into_body()
                .collect()
                .await
                .map_err(|e| DeliveryError::Upstream(Box::new(e)))?;
            Ok::<_, DeliveryError>(status)
        };

        tokio::time::timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| DeliveryError::Timeout(self.request_timeout))?
    }
}
