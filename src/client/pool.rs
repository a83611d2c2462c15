//! Sender pool management.
//!
//! # Responsibilities
//! - Hand out one idle sender per caller so sends can run in parallel
//! - Create a new sender when none is idle
//! - Take every sender back when the caller is done with it
//!
//! # Design Decisions
//! - Checkout returns a guard; dropping it returns the sender, so senders
//!   come back on success, error, cancellation and panic alike
//! - No eviction and no cap: concurrency is bounded by the callers

use std::net::SocketAddr;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use http_body::Body;
use tokio_util::sync::CancellationToken;

use crate::client::sender::{GatewaySender, SendError};
use crate::codec::{BoxError, RequestHead};

#[derive(Debug)]
struct PoolInner {
    destination: SocketAddr,
    idle: Mutex<Vec<GatewaySender>>,
    created: AtomicUsize,
}

impl PoolInner {
    fn idle(&self) -> MutexGuard<'_, Vec<GatewaySender>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pool of senders for a single gateway.
#[derive(Debug, Clone)]
pub struct SenderPool {
    inner: Arc<PoolInner>,
}

impl SenderPool {
    pub fn new(destination: SocketAddr) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                destination,
                idle: Mutex::new(Vec::new()),
                created: AtomicUsize::new(0),
            }),
        }
    }

    pub fn destination(&self) -> SocketAddr {
        self.inner.destination
    }

    /// Take an idle sender, or create one if none is available.
    pub async fn checkout(&self) -> Result<PooledSender, SendError> {
        let idle = self.inner.idle().pop();
        let sender = match idle {
            Some(sender) => sender,
            None => {
                let sender = GatewaySender::connect(self.inner.destination).await?;
                let created = self.inner.created.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!(destination = %self.inner.destination, created, "Sender created");
                sender
            }
        };

        Ok(PooledSender {
            sender: Some(sender),
            pool: Arc::clone(&self.inner),
        })
    }

    /// Check out a sender, send, and return it.
    pub async fn send<B>(
        &self,
        head: &RequestHead,
        body: Option<B>,
        cancel: &CancellationToken,
    ) -> Result<usize, SendError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let mut sender = self.checkout().await?;
        sender.send(head, body, cancel).await
    }

    /// Number of senders currently waiting in the pool.
    pub fn idle_count(&self) -> usize {
        self.inner.idle().len()
    }

    /// Number of senders this pool has ever created.
    pub fn created_count(&self) -> usize {
        self.inner.created.load(Ordering::Relaxed)
    }
}

/// A sender checked out of a [`SenderPool`].
///
/// When dropped, the sender goes back to the pool.
#[derive(Debug)]
pub struct PooledSender {
    sender: Option<GatewaySender>,
    pool: Arc<PoolInner>,
}

impl Deref for PooledSender {
    type Target = GatewaySender;

    fn deref(&self) -> &GatewaySender {
        self.sender.as_ref().expect("sender is present until drop")
    }
}

impl DerefMut for PooledSender {
    fn deref_mut(&mut self) -> &mut GatewaySender {
        self.sender.as_mut().expect("sender is present until drop")
    }
}

impl Drop for PooledSender {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.take() {
            self.pool.idle().push(sender);
        }
    }
}
