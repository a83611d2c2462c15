//! Send one HTTP request through the gateway as a single UDP datagram.

use std::path::PathBuf;

use clap::Parser;
use http::Method;
use tokio_util::sync::CancellationToken;

use udp_http_gateway::codec::{HttpVersion, RequestHead, WireRequest};
use udp_http_gateway::config::{self, GatewayConfig};
use udp_http_gateway::observability;
use udp_http_gateway::GatewaySender;

#[derive(Parser)]
#[command(name = "gateway-send")]
#[command(about = "Send an HTTP request through a UDP gateway", long_about = None)]
struct Cli {
    /// Gateway endpoint (ip:port)
    #[arg(short, long)]
    gateway: Option<String>,

    /// Config file providing `sender.gateway_endpoint`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Header line, "Name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Request body
    #[arg(short, long, conflicts_with = "data_file")]
    data: Option<String>,

    /// Read the request body from a file
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// HTTP version written on the request line
    #[arg(long, default_value = "1.1")]
    http_version: HttpVersion,

    /// Absolute request URL
    url: String,
}

fn build_request(cli: &Cli) -> Result<WireRequest, Box<dyn std::error::Error>> {
    let method = Method::from_bytes(cli.method.as_bytes())?;
    let mut head = RequestHead::new(method, cli.url.as_str()).with_version(cli.http_version);

    for line in &cli.headers {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| format!("header {line:?} is not \"Name: value\""))?;
        head.append_header(name.trim(), value.trim())?;
    }

    let body = match (&cli.data, &cli.data_file) {
        (Some(data), _) => Some(data.clone().into_bytes()),
        (None, Some(path)) => Some(std::fs::read(path)?),
        (None, None) => None,
    };

    let request = WireRequest::new(head);
    Ok(match body {
        Some(body) => request.with_body(body),
        None => request,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    observability::logging::init(&config.observability.log_level);

    let gateway = cli.gateway.as_deref().unwrap_or(&config.sender.gateway_endpoint);
    let gateway = config::parse_endpoint("--gateway", gateway)?;

    let request = build_request(&cli)?;
    let mut sender = GatewaySender::connect(gateway).await?;
    let sent = sender.send_request(&request, &CancellationToken::new()).await?;

    println!("sent {sent} bytes to {gateway}");
    Ok(())
}
