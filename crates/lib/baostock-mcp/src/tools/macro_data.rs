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

/// Parameters for macro-economic series.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MacroDataParams {
    /// One of `gdp`, `ppi`, `cpi`, `pmi`.
    pub data_type: String,
    pub year: Option<String>,
}

#[tool_router(router = tool_router_macro, vis = "pub")]
impl<P: DataProvider> BaostockMcp<P> {
    #[tool(description = "Macro-economic series (gdp, ppi, cpi or pmi), optionally limited to one year.")]
    async fn get_macro_data(
        &self,
        Parameters(params): Parameters<MacroDataParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let year = params.year.unwrap_or_default();
        let result = self
            .control()
            .macro_data(params.data_type.trim(), &year)
            .await;
        helpers::list_result("get_macro_data", result)
    }
}

#[cfg(test)]
mod tests {
    use baostock_core::provider::MemoryProvider;
    use serde_json::json;

    use super::*;
    use crate::testing::{payload, server};

    #[tokio::test]
    async fn unknown_series_is_an_error_record() {
        let server = server(MemoryProvider::new()).await;
        let result = server
            .get_macro_data(Parameters(MacroDataParams {
                data_type: "m2".to_string(),
                year: None,
            }))
            .await
            .expect("tool result");
        assert_eq!(payload(&result), json!([{ "error": "unsupported data type: m2" }]));
    }
}
