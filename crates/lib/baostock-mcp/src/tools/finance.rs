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
use crate::tools::stock::CodeRangeParams;

/// Parameters for the quarterly financial report.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FinancialDataParams {
    pub code: String,
    pub year: Option<i32>,
    /// 1 to 4. When year or quarter is omitted the latest published quarter is used.
    pub quarter: Option<u32>,
}

#[tool_router(router = tool_router_finance, vis = "pub")]
impl<P: DataProvider> BaostockMcp<P> {
    #[tool(description = "Quarterly profitability, operation, growth, balance and cash flow indicators for a security. Categories without data are null.")]
    async fn get_financial_data(
        &self,
        Parameters(params): Parameters<FinancialDataParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .control()
            .financial_data(&params.code, params.year, params.quarter)
            .await;
        helpers::object_result("get_financial_data", result)
    }

    #[tool(description = "Performance express reports (EPS, ROE, net profit, revenue) published between two dates.")]
    async fn get_performance_express_report(
        &self,
        Parameters(params): Parameters<CodeRangeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .control()
            .performance_express(&params.code, &params.start_date, &params.end_date)
            .await;
        helpers::list_result("get_performance_express_report", result)
    }

    #[tool(description = "Earnings forecasts published between two dates.")]
    async fn get_forecast_report(
        &self,
        Parameters(params): Parameters<CodeRangeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .control()
            .forecast(&params.code, &params.start_date, &params.end_date)
            .await;
        helpers::list_result("get_forecast_report", result)
    }
}

#[cfg(test)]
mod tests {
    use baostock_core::provider::{Canned, FinancialKind, MemoryProvider, VendorQuery};
    use serde_json::Value;

    use super::*;
    use crate::testing::{payload, server};

    #[tokio::test]
    async fn missing_categories_serialize_as_null() {
        let profit = VendorQuery::Financial {
            kind: FinancialKind::Profit,
            code: "sh.600000".to_string(),
            year: 2024,
            quarter: 2,
        };
        let provider = MemoryProvider::new()
            .with_response(
                profit,
                Canned::rows("code,statDate,roeAvg", &[&["sh.600000", "2024-06-30", "0.05"]]),
            )
            .with_fallback(Canned::status("10002007", "no data"));
        let server = server(provider).await;

        let result = server
            .get_financial_data(Parameters(FinancialDataParams {
                code: "SSE:600000".to_string(),
                year: None,
                quarter: None,
            }))
            .await
            .expect("tool result");
        let report = payload(&result);
        assert_eq!(report["year"], 2024);
        assert_eq!(report["quarter"], 2);
        assert_eq!(report["internal_ticker"], "SSE:600000");
        assert_eq!(report["profitability"]["roeAvg"], "0.05");
        assert_eq!(report["growth"], Value::Null);
        assert_eq!(report["cash_flow"], Value::Null);
    }

    #[tokio::test]
    async fn forecast_without_rows_reports_not_found() {
        let server = server(MemoryProvider::new().with_fallback(Canned::empty("code"))).await;
        let result = server
            .get_forecast_report(Parameters(CodeRangeParams {
                code: "sz.000001".to_string(),
                start_date: "2023-01-01".to_string(),
                end_date: "2023-12-31".to_string(),
            }))
            .await
            .expect("tool result");
        assert_eq!(payload(&result)[0]["error"], "no forecast data found");
    }
}
