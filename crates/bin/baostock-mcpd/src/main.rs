//! Daemon entry point for the baostock MCP server.
//!
//! Loads configuration from the command line and environment, logs in to the
//! vendor once, serves the MCP protocol over stdio or streamable HTTP, and logs
//! out on shutdown.

mod config;

use std::sync::Arc;

use baostock_core::provider::BaostockClient;
use baostock_core::services::VendorSession;
use baostock_mcp::server::{serve_stdio, serve_streamable_http};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::BaostockConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = BaostockConfig::from_args()?;

    // stdout carries the stdio transport.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_directive()))
        .with_writer(std::io::stderr)
        .init();

    let client = BaostockClient::connect(config.client.clone()).await?;
    let session = Arc::new(VendorSession::establish(client).await?);

    let served = if config.enable_stdio {
        serve_stdio(session.clone()).await
    } else {
        serve_streamable_http(session.clone(), config.http.clone()).await
    };
    if let Err(err) = &served {
        error!(error = %err, "MCP server stopped with an error");
    }

    session.release().await;
    info!("baostock-mcpd stopped");
    served
}
