use baostock_core::provider::DataProvider;
use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::BaostockMcp;

/// Payload listing the MCP commands served here.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HelpCommands {
    pub commands: Vec<String>,
}

impl Default for HelpCommands {
    fn default() -> Self {
        Self {
            commands: vec![
                "help - List MCP commands to get context with how this MCP server works."
                    .to_string(),
                "ticker_help - Describes the vendor and internal security identifier formats."
                    .to_string(),
                "health - Health check. Returns 'ok'.".to_string(),
                "get_stock_basic - Basic listing information for a security or all securities."
                    .to_string(),
                "get_daily_price - Unadjusted daily bars for a security between two dates."
                    .to_string(),
                "get_real_time_price - Latest daily bar of the current month for a security."
                    .to_string(),
                "search_stocks - Search today's security list by name or code."
                    .to_string(),
                "get_financial_data - Quarterly financial indicators grouped by statement category."
                    .to_string(),
                "get_trade_dates - Trading calendar between two dates.".to_string(),
                "get_dividend_data - Dividend records for a security.".to_string(),
                "get_stock_industry - Industry classification for a security or all securities."
                    .to_string(),
                "get_index_data - Index bars between two dates.".to_string(),
                "get_macro_data - Macro-economic series: gdp, ppi, cpi, pmi.".to_string(),
                "get_index_constituents - Constituents of hs300, zz500 or sz50."
                    .to_string(),
                "get_adjust_factor - Price adjustment factors for a security between two dates."
                    .to_string(),
                "get_performance_express_report - Performance express reports between two dates."
                    .to_string(),
                "get_forecast_report - Earnings forecasts between two dates.".to_string(),
                "get_all_stocks_daily_price - Daily bar on one date for the first listed securities."
                    .to_string(),
            ],
        }
    }
}

#[tool_router(router = tool_router_context, vis = "pub")]
impl<P: DataProvider> BaostockMcp<P> {
    #[tool(description = "List the MCP commands to get context with how this MCP server works.")]
    async fn help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::json(HelpCommands::default())?]))
    }

    #[tool(description = "Describes the vendor and internal security identifier formats accepted by the tools.")]
    async fn ticker_help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text(
r"
1.  Two identifier forms are accepted wherever a security or index code is asked for:
        - vendor form: `sh.600000` (Shanghai), `sz.000001` (Shenzhen).
        - internal form: `SSE:600000` (Shanghai), `SZSE:000001` (Shenzhen).
    Internal tickers are converted to the vendor form before querying.
    Anything else is passed to the vendor unchanged.
2.  Every record that carries a `code` also carries `internal_ticker`, the same code in internal form.
    Codes outside Shanghai and Shenzhen keep their vendor form in `internal_ticker`.
3.  Index codes use the same scheme, e.g. `sh.000300` for CSI 300 and `sh.000001` for the SSE Composite.
    `get_index_constituents` takes a short index name instead: `hs300`, `zz500` or `sz50`.
4.  Dates are `YYYY-MM-DD`. Financial periods are a year plus a quarter from 1 to 4.
"
        )]))
    }
}
