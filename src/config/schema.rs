//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// UDP receiver settings.
    pub receiver: ReceiverConfig,

    /// Outbound HTTP settings used when delivering decoded requests.
    pub forwarder: ForwarderConfig,

    /// Settings for the sending side (`gateway-send`).
    pub sender: SenderConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Receiver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Bind address (e.g., "0.0.0.0:4280").
    pub endpoint: String,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            endpoint: "0.0.0.0:4280".to_string(),
        }
    }
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwarderConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total time for one forwarded request/response in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// Sender configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Gateway address datagrams are sent to.
    pub gateway_endpoint: String,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            gateway_endpoint: "127.0.0.1:4280".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
