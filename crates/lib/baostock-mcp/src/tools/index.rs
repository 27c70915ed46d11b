use baostock_core::provider::DataProvider;
use baostock_model::schema::FREQUENCY_DAILY;
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

/// Parameters for index bars.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct IndexDataParams {
    /// Index code such as `sh.000300` or `SSE:000001`.
    pub index_code: String,
    pub start_date: String,
    pub end_date: String,
    /// `d`, `w` or `m`. Defaults to `d`.
    pub frequency: Option<String>,
}

/// Parameters for index constituents.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct IndexConstituentsParams {
    /// One of `hs300`, `zz500`, `sz50`.
    pub index_code: String,
    pub date: Option<String>,
}

#[tool_router(router = tool_router_index, vis = "pub")]
impl<P: DataProvider> BaostockMcp<P> {
    #[tool(description = "Index bars between two dates at daily, weekly or monthly frequency.")]
    async fn get_index_data(
        &self,
        Parameters(params): Parameters<IndexDataParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let frequency = params
            .frequency
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| FREQUENCY_DAILY.to_string());
        let result = self
            .control()
            .index_data(&params.index_code, &params.start_date, &params.end_date, &frequency)
            .await;
        helpers::list_result("get_index_data", result)
    }

    #[tool(description = "Constituents of the hs300, zz500 or sz50 index, optionally as of a date.")]
    async fn get_index_constituents(
        &self,
        Parameters(params): Parameters<IndexConstituentsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let date = params.date.unwrap_or_default();
        let result = self
            .control()
            .index_constituents(params.index_code.trim(), &date)
            .await;
        helpers::list_result("get_index_constituents", result)
    }
}

#[cfg(test)]
mod tests {
    use baostock_core::provider::{Canned, MemoryProvider, VendorQuery};
    use baostock_model::schema::{ADJUST_FLAG_NONE, KDATA_INDEX_FIELDS};
    use serde_json::json;

    use super::*;
    use crate::testing::{payload, server};

    #[tokio::test]
    async fn unknown_index_is_an_error_record() {
        let server = server(MemoryProvider::new()).await;
        let result = server
            .get_index_constituents(Parameters(IndexConstituentsParams {
                index_code: "csi1000".to_string(),
                date: None,
            }))
            .await
            .expect("tool result");
        assert_eq!(payload(&result), json!([{ "error": "unsupported index: csi1000" }]));
    }

    #[tokio::test]
    async fn index_frequency_defaults_to_daily() {
        let query = VendorQuery::KData {
            code: "sh.000300".to_string(),
            fields: KDATA_INDEX_FIELDS.to_string(),
            start_date: "2024-01-02".to_string(),
            end_date: "2024-01-02".to_string(),
            frequency: "d".to_string(),
            adjust_flag: ADJUST_FLAG_NONE.to_string(),
        };
        let provider = MemoryProvider::new().with_response(
            query,
            Canned::rows(
                KDATA_INDEX_FIELDS,
                &[&["2024-01-02", "sh.000300", "3431.1", "3439.9", "3386.3", "3386.4", "9841553000", "1.4e11"]],
            ),
        );
        let server = server(provider).await;
        let result = server
            .get_index_data(Parameters(IndexDataParams {
                index_code: "SSE:000300".to_string(),
                start_date: "2024-01-02".to_string(),
                end_date: "2024-01-02".to_string(),
                frequency: None,
            }))
            .await
            .expect("tool result");
        let bars = payload(&result);
        assert_eq!(bars[0]["volume"], 9_841_553_000_i64);
        assert_eq!(bars[0]["internal_ticker"], "SSE:000300");
    }
}
