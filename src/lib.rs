//! HTTP-over-UDP gateway library.
//!
//! ```text
//!   application ──▶ UdpGatewayService ──▶ SenderPool ──▶ GatewaySender
//!                                                            │ one datagram
//!                                                            ▼
//!   destination ◀── HttpForwarder ◀── decode ◀── UdpReceiver
//! ```

// Wire format
pub mod codec;

// Sending side
pub mod client;

// Receiving side
pub mod delivery;
pub mod net;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use client::{GatewaySender, SendError, SenderPool, UdpGatewayService};
pub use codec::{decode, CodecError, RequestHead, WireRequest, MAX_DATAGRAM_SIZE};
pub use config::GatewayConfig;
pub use delivery::{Deliver, DeliveryError, HttpForwarder};
pub use lifecycle::Shutdown;
pub use net::{ReceiverError, ReceiverStats, UdpReceiver};
