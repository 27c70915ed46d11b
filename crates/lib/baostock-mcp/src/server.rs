//! MCP server runners for baostock-mcp.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use baostock_core::provider::DataProvider;
use baostock_core::services::VendorSession;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use tracing::info;

use crate::BaostockMcp;

pub const DEFAULT_MCP_HTTP_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 4020);

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub sse_retry: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
            sse_retry: Some(Duration::from_secs(3)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

}

impl Default for McpHttpServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MCP_HTTP_ADDR)
    }
}

/// Serves the MCP server over stdio until the client disconnects or ctrl-c.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio<P: DataProvider>(
    session: Arc<VendorSession<P>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = BaostockMcp::with_session(session);
    let (stdin, stdout) = stdio();
    info!("serving MCP over stdio");
    let running = serve_server(service, (stdin, stdout)).await?;
    // Dropping the running service on shutdown cancels it.
    until_shutdown(running.waiting(), shutdown_signal()).await?;
    Ok(())
}

/// Runs `work` until it finishes or `shutdown` resolves, whichever is first.
async fn until_shutdown<T, E>(
    work: impl Future<Output = Result<T, E>>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), E> {
    tokio::select! {
        done = work => done.map(|_| ()),
        () = shutdown => Ok(()),
    }
}

/// Serves the MCP server using streamable HTTP transport until ctrl-c.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http<P: DataProvider>(
    session: Arc<VendorSession<P>>,
    config: McpHttpServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service_session = session.clone();
    let service: StreamableHttpService<BaostockMcp<P>, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(BaostockMcp::with_session(service_session.clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                sse_keep_alive: config.sse_keep_alive,
                sse_retry: config.sse_retry,
                stateful_mode: config.stateful_mode,
                ..Default::default()
            },
        );

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", service);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "serving MCP over streamable HTTP");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_binds_localhost() {
        let config = McpHttpServerConfig::default().with_stateful_mode(false);
        assert_eq!(config.addr.to_string(), "127.0.0.1:4020");
        assert!(!config.stateful_mode);
        assert_eq!(config.sse_keep_alive, Some(Duration::from_secs(15)));
    }

    #[tokio::test]
    async fn shutdown_ends_a_running_service() {
        let work = std::future::pending::<Result<(), std::io::Error>>();
        until_shutdown(work, async {}).await.expect("shutdown is not an error");
    }

    #[tokio::test]
    async fn service_errors_still_surface() {
        let work = async { Err::<(), _>(std::io::Error::other("transport closed")) };
        let err = until_shutdown(work, std::future::pending())
            .await
            .expect_err("work failed first");
        assert_eq!(err.to_string(), "transport closed");
    }
}
