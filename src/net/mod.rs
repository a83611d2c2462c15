//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming UDP datagram
//!     → receiver.rs (receive loop, one datagram at a time)
//!     → codec::decode
//!     → delivery::Deliver (awaited before the next receive)
//!
//! Receiver States:
//!     Binding → Listening → ReceivingOne* → Stopped
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: ordering of deliveries follows arrival order
//! - Per-datagram problems never stop the loop
//! - One 64 KiB buffer reused for every datagram

pub mod receiver;

pub use receiver::{ReceiverError, ReceiverStats, UdpReceiver};
