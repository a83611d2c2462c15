//! Delivery of decoded requests to their destination.
//!
//! # Responsibilities
//! - Define the [`Deliver`] seam used by the receiver
//! - Provide [`HttpForwarder`], which sends over real HTTP
//!
//! # Design Decisions
//! - Only the status and the error signal matter; response bodies are
//!   drained and discarded
//! - No retries: the gateway has no durability layer

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

use crate::codec::{BoxError, WireRequest};

pub mod forwarder;

pub use forwarder::HttpForwarder;

/// Errors reported while delivering a request.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The decoded request cannot be expressed as an HTTP request.
    #[error("request cannot be forwarded: {0}")]
    InvalidRequest(String),

    /// The destination could not be reached or the exchange failed.
    #[error("upstream request failed: {0}")]
    Upstream(#[source] BoxError),

    /// The exchange did not finish in time.
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
}

/// Sends a decoded request somewhere and reports the outcome.
pub trait Deliver: Send + Sync {
    fn deliver(
        &self,
        request: WireRequest,
    ) -> impl Future<Output = Result<StatusCode, DeliveryError>> + Send;
}

impl<D: Deliver> Deliver for Arc<D> {
    fn deliver(
        &self,
        request: WireRequest,
    ) -> impl Future<Output = Result<StatusCode, DeliveryError>> + Send {
        (**self).deliver(request)
    }
}
