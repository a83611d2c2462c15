//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Forwarder → Bind receiver → Receive loop
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Receive loop finishes its current delivery → Stats logged → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Shutdown is cooperative; nothing is aborted mid-delivery

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
