use baostock_core::provider::DataProvider;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::BaostockMcp;
use crate::helpers;

/// Parameters for the trading calendar.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TradeDatesParams {
    pub start_date: String,
    pub end_date: String,
}

#[tool_router(router = tool_router_market, vis = "pub")]
impl<P: DataProvider> BaostockMcp<P> {
    #[tool(description = "Trading calendar between start_date and end_date with an is_trading_day flag per day.")]
    async fn get_trade_dates(
        &self,
        Parameters(params): Parameters<TradeDatesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .control()
            .trade_dates(&params.start_date, &params.end_date)
            .await;
        helpers::list_result("get_trade_dates", result)
    }
}
