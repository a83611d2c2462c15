//! Sending side of the gateway.
//!
//! # Data Flow
//! ```text
//! http::Request<B>
//!     → service.rs (tower::Service, synthetic 200 OK)
//!     → pool.rs (checkout / return)
//!     → sender.rs (encode into owned buffer, one datagram)
//!     → UDP → gateway
//! ```
//!
//! # Design Decisions
//! - A sender owns its buffer, so it is single-flight (`&mut self`)
//! - Parallelism comes from the pool handing out distinct senders
//! - Errors surface to the caller; nothing is retried

pub mod pool;
pub mod sender;
pub mod service;

pub use pool::{PooledSender, SenderPool};
pub use sender::{GatewaySender, SendError};
pub use service::UdpGatewayService;
