//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the HTTP forwarder from configuration
//! - Bind the receiver and run it until shutdown
//!
//! # Design Decisions
//! - Fail fast: a bind error is returned before any datagram is read
//! - Configuration is already validated by the caller

use tokio_util::sync::CancellationToken;

use crate::config::GatewayConfig;
use crate::delivery::HttpForwarder;
use crate::net::{ReceiverError, ReceiverStats, UdpReceiver};

/// Run the gateway until `shutdown` is cancelled.
pub async fn run(config: &GatewayConfig, shutdown: CancellationToken) -> Result<ReceiverStats, ReceiverError> {
    tracing::info!(
        endpoint = %config.receiver.endpoint,
        connect_timeout_secs = config.forwarder.connect_timeout_secs,
        request_timeout_secs = config.forwarder.request_timeout_secs,
        "Starting gateway"
    );

    let forwarder = HttpForwarder::new(&config.forwarder);
    let receiver = UdpReceiver::bind(&config.receiver.endpoint, forwarder).await?;
    receiver.run(shutdown).await
}
