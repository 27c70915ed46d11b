use baostock_core::provider::DataProvider;
use baostock_model::schema::YEAR_TYPE_REPORT;
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

const DEFAULT_SEARCH_LIMIT: usize = 10;
const DEFAULT_BULK_LIMIT: usize = 100;

/// Parameters for tools that take an optional security code.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct OptionalCodeParams {
    /// `sh.600000` or `SSE:600000`. Empty or omitted means every security.
    pub code: Option<String>,
}

/// Parameters for a security code and a date range.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CodeRangeParams {
    pub code: String,
    pub start_date: String,
    pub end_date: String,
}

/// Parameters for a single security code.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CodeParams {
    pub code: String,
}

/// Parameters for keyword search over today's security list.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchStocksParams {
    pub keyword: String,
    pub limit: Option<usize>,
}

/// Parameters for dividend lookups.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DividendParams {
    pub code: String,
    pub year: Option<String>,
    /// `report` (announcement year) or `operate` (ex-dividend year).
    pub year_type: Option<String>,
}

/// Parameters for the bulk daily price lookup.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AllStocksDailyPriceParams {
    pub date: String,
    pub limit: Option<usize>,
}

#[tool_router(router = tool_router_stock, vis = "pub")]
impl<P: DataProvider> BaostockMcp<P> {
    #[tool(description = "Basic listing information (name, IPO date, type, status) for a security, or all securities when code is omitted.")]
    async fn get_stock_basic(
        &self,
        Parameters(params): Parameters<OptionalCodeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let code = params.code.unwrap_or_default();
        let result = self.control().stock_basic(code.trim()).await;
        helpers::list_result("get_stock_basic", result)
    }

    #[tool(description = "Unadjusted daily bars for a security between start_date and end_date (YYYY-MM-DD).")]
    async fn get_daily_price(
        &self,
        Parameters(params): Parameters<CodeRangeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .control()
            .daily_price(&params.code, &params.start_date, &params.end_date)
            .await;
        helpers::list_result("get_daily_price", result)
    }

    #[tool(description = "Latest daily bar of the current month for a security, with price set to the close.")]
    async fn get_real_time_price(
        &self,
        Parameters(params): Parameters<CodeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self.control().latest_price(&params.code).await;
        helpers::object_result("get_real_time_price", result)
    }

    #[tool(description = "Search today's security list by name or code (case-insensitive substring). Default limit 10.")]
    async fn search_stocks(
        &self,
        Parameters(params): Parameters<SearchStocksParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let result = self.control().search_stocks(&params.keyword, limit).await;
        helpers::list_result("search_stocks", result)
    }

    #[tool(description = "Dividend records for a security. year_type is 'report' (default) or 'operate'.")]
    async fn get_dividend_data(
        &self,
        Parameters(params): Parameters<DividendParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let year = params.year.unwrap_or_default();
        let year_type = params
            .year_type
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| YEAR_TYPE_REPORT.to_string());
        let result = self
            .control()
            .dividend_data(&params.code, &year, &year_type)
            .await;
        helpers::list_result("get_dividend_data", result)
    }

    #[tool(description = "Industry classification for a security, or all securities when code is omitted.")]
    async fn get_stock_industry(
        &self,
        Parameters(params): Parameters<OptionalCodeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let code = params.code.unwrap_or_default();
        let result = self.control().stock_industry(code.trim()).await;
        helpers::list_result("get_stock_industry", result)
    }

    #[tool(description = "Fore, back and combined price adjustment factors for a security between two dates.")]
    async fn get_adjust_factor(
        &self,
        Parameters(params): Parameters<CodeRangeParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .control()
            .adjust_factor(&params.code, &params.start_date, &params.end_date)
            .await;
        helpers::list_result("get_adjust_factor", result)
    }

    #[tool(description = "Daily bar on one date for the first listed securities. Securities without data are skipped. Default limit 100.")]
    async fn get_all_stocks_daily_price(
        &self,
        Parameters(params): Parameters<AllStocksDailyPriceParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let limit = params.limit.unwrap_or(DEFAULT_BULK_LIMIT);
        let result = self
            .control()
            .all_stocks_daily_price(&params.date, limit)
            .await;
        helpers::list_result("get_all_stocks_daily_price", result)
    }
}

#[cfg(test)]
mod tests {
    use baostock_core::provider::{Canned, MemoryProvider, VendorQuery};
    use baostock_model::schema::FIELDS_ALL_STOCK;
    use serde_json::json;

    use super::*;
    use crate::testing::{payload, server};

    #[tokio::test]
    async fn search_defaults_to_ten_hits() {
        let rows: Vec<Vec<String>> = (0..15)
            .map(|n| {
                vec![
                    format!("sh.{:06}", 600_000 + n),
                    "1".to_string(),
                    format!("Bank {n}"),
                ]
            })
            .collect();
        let provider = MemoryProvider::new().with_response(
            VendorQuery::AllStock {
                day: "2024-04-18".to_string(),
            },
            Canned::Rows {
                fields: baostock_model::schema::split_fields(FIELDS_ALL_STOCK),
                rows,
            },
        );
        let server = server(provider).await;
        let result = server
            .search_stocks(Parameters(SearchStocksParams {
                keyword: "BANK".to_string(),
                limit: None,
            }))
            .await
            .expect("tool result");
        let hits = payload(&result);
        assert_eq!(hits.as_array().map(Vec::len), Some(10));
        assert_eq!(hits[0]["internal_ticker"], "SSE:600000");
    }

    #[tokio::test]
    async fn vendor_failure_is_an_in_band_error_record() {
        let provider =
            MemoryProvider::new().with_fallback(Canned::status("10004011", "invalid stock code"));
        let server = server(provider).await;
        let result = server
            .get_daily_price(Parameters(CodeRangeParams {
                code: "sh.999999".to_string(),
                start_date: "2024-01-01".to_string(),
                end_date: "2024-01-31".to_string(),
            }))
            .await
            .expect("tool result");
        assert_ne!(result.is_error, Some(true));
        assert_eq!(payload(&result), json!([{ "error": "query failed: invalid stock code" }]));
    }

    #[tokio::test]
    async fn real_time_price_error_is_a_bare_object() {
        let server = server(MemoryProvider::new().with_fallback(Canned::empty("date,code"))).await;
        let result = server
            .get_real_time_price(Parameters(CodeParams {
                code: "SZSE:000001".to_string(),
            }))
            .await
            .expect("tool result");
        assert_eq!(payload(&result), json!({ "error": "no price data found" }));
    }

    #[tokio::test]
    async fn dividend_year_type_defaults_to_report() {
        let provider = MemoryProvider::new().with_fallback(Canned::empty("code"));
        let server = server(provider).await;
        let _ = server
            .get_dividend_data(Parameters(DividendParams {
                code: "sh.600000".to_string(),
                year: None,
                year_type: None,
            }))
            .await
            .expect("tool result");
        let calls = server.control().provider().calls();
        assert_eq!(
            calls,
            vec![VendorQuery::Dividend {
                code: "sh.600000".to_string(),
                year: String::new(),
                year_type: "report".to_string(),
            }]
        );
    }
}
