//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Receiver, sender and forwarder produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Metrics are cheap (atomic increments) and are no-ops until a recorder
//!   is installed
//! - Per-datagram problems never log above `warn`

pub mod logging;
pub mod metrics;
