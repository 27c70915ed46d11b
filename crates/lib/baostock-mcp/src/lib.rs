//! MCP server implementation for baostock-mcp.
//!
//! This crate wires the query plane into rmcp tool handlers and exposes the
//! MCP-facing API surface for market, financial, and macro data.

mod helpers;
mod tools;
pub mod server;

use std::sync::Arc;

use baostock_core::control::QueryPlane;
use baostock_core::provider::DataProvider;
use baostock_core::services::VendorSession;
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};

pub use tools::context::HelpCommands;

const SERVER_INSTRUCTIONS: &str = r#"baostock-mcp provides MCP tools for Chinese A-share market data served by Baostock.

Identifiers:
- Securities are accepted as vendor codes (`sh.600000`, `sz.000001`) or internal tickers
  (`SSE:600000`, `SZSE:000001`). Every record carrying a code also carries `internal_ticker`.
- Dates use `YYYY-MM-DD`.

Tools:
1. Stock data: `get_stock_basic`, `get_daily_price`, `get_real_time_price`, `search_stocks`,
   `get_dividend_data`, `get_stock_industry`, `get_adjust_factor`, `get_all_stocks_daily_price`.
2. Financial data: `get_financial_data`, `get_performance_express_report`, `get_forecast_report`.
3. Market data: `get_trade_dates`.
4. Index data: `get_index_data`, `get_index_constituents` (`hs300`, `zz500`, `sz50`).
5. Macro data: `get_macro_data` (`gdp`, `ppi`, `cpi`, `pmi`).

Notes:
- Failures are returned in-band: list tools answer `[{"error": "..."}]`, object tools `{"error": "..."}`.
- A query that matches nothing is reported as an error, not an empty list. `search_stocks` is the exception.
- Prices are unadjusted daily bars. `get_real_time_price` returns the latest bar of the current month.
- Use `help` and `ticker_help` for guidance. `health` returns `ok`."#;

/// MCP server wrapper around the vendor session and tool routers.
pub struct BaostockMcp<P: DataProvider> {
    tool_router: ToolRouter<Self>,
    session: Arc<VendorSession<P>>,
}

impl<P: DataProvider> Clone for BaostockMcp<P> {
    fn clone(&self) -> Self {
        Self {
            tool_router: self.tool_router.clone(),
            session: self.session.clone(),
        }
    }
}

impl<P: DataProvider> BaostockMcp<P> {
    /// Creates a new server owning the session.
    #[must_use]
    pub fn new(session: VendorSession<P>) -> Self {
        Self::with_session(Arc::new(session))
    }

    /// Creates a new server using a shared session handle.
    #[must_use]
    pub fn with_session(session: Arc<VendorSession<P>>) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_stock()
            + Self::tool_router_finance()
            + Self::tool_router_market()
            + Self::tool_router_index()
            + Self::tool_router_macro()
            + Self::tool_router_context();
        Self {
            tool_router,
            session,
        }
    }

    pub(crate) fn control(&self) -> QueryPlane<P> {
        self.session.control()
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl<P: DataProvider> BaostockMcp<P> {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl<P: DataProvider> ServerHandler for BaostockMcp<P> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}


#[cfg(test)]
mod tests {
    use baostock_core::provider::MemoryProvider;

    use super::*;

    const TOOL_NAMES: [&str; 18] = [
        "get_stock_basic",
        "get_daily_price",
        "get_real_time_price",
        "search_stocks",
        "get_financial_data",
        "get_trade_dates",
        "get_dividend_data",
        "get_stock_industry",
        "get_index_data",
        "get_macro_data",
        "get_index_constituents",
        "get_adjust_factor",
        "get_performance_express_report",
        "get_forecast_report",
        "get_all_stocks_daily_price",
        "health",
        "help",
        "ticker_help",
    ];

    #[tokio::test]
    async fn registers_every_tool() {
        let server = testing::server(MemoryProvider::new()).await;
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        let mut expected: Vec<String> = TOOL_NAMES.iter().map(|name| (*name).to_string()).collect();
        expected.sort();
        assert_eq!(names, expected);
    }

    #[test]
    fn help_lists_every_registered_tool() {
        let help = HelpCommands::default();
        for name in TOOL_NAMES {
            assert!(
                help.commands.iter().any(|line| line.starts_with(&format!("{name} - "))),
                "help is missing {name}"
            );
        }
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let server = testing::server(MemoryProvider::new()).await;
        let result = server.health().await.expect("health");
        let text = result
            .content
            .first()
            .and_then(|content| content.as_text())
            .map(|content| content.text.clone());
        assert_eq!(text.as_deref(), Some("ok"));
        assert!(server.get_info().instructions.is_some());
    }
}
