//! UDP-to-HTTP gateway.
//!
//! Receives HTTP requests encoded one per UDP datagram and forwards each to
//! the destination named in its request line, one at a time.

use std::path::PathBuf;

use clap::Parser;

use udp_http_gateway::config::{self, GatewayConfig};
use udp_http_gateway::lifecycle::{self, signals, Shutdown};
use udp_http_gateway::observability;

#[derive(Parser)]
#[command(name = "udp-http-gateway")]
#[command(about = "Forward HTTP requests received as UDP datagrams", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Receiver endpoint (ip:port), overrides the config file
    #[arg(short, long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(endpoint) = cli.endpoint {
        config::parse_endpoint("--endpoint", &endpoint)?;
        config.receiver.endpoint = endpoint;
    }

    observability::logging::init(&config.observability.log_level);
    tracing::info!("udp-http-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr = config::parse_endpoint("observability.metrics_address", &config.observability.metrics_address)?;
        observability::metrics::init_metrics(addr)?;
    }

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        signal_shutdown.trigger();
    });

    let stats = lifecycle::startup::run(&config, shutdown.subscribe()).await?;

    tracing::info!(
        delivered = stats.delivered,
        delivery_failures = stats.delivery_failures,
        "Shutdown complete"
    );
    Ok(())
}
