use baostock_model::MacroPoint;

use crate::provider::{DataProvider, MacroKind, VendorQuery};

use super::{QueryError, QueryPlane, Row};

pub const NOT_FOUND_MACRO: &str = "no macro data found";

impl<P: DataProvider> QueryPlane<P> {
    /// Observations of the `gdp`, `ppi`, `cpi` or `pmi` series for `year`.
    ///
    /// # Errors
    /// Returns `QueryError::UnsupportedDataType` for any other series name, and
    /// `QueryError` if the vendor rejects the query or returns no rows.
    pub async fn macro_data(&self, data_type: &str, year: &str) -> Result<Vec<MacroPoint>, QueryError> {
        let kind: MacroKind = data_type
            .parse()
            .map_err(QueryError::UnsupportedDataType)?;
        let query = VendorQuery::Macro {
            kind,
            year: year.to_string(),
        };
        self.collect(query, NOT_FOUND_MACRO, |row: &Row| {
            Ok(MacroPoint {
                stat_year: row.text(0),
                stat_quarter: row.text(1),
                data_value: row.float(2, "data_value")?,
                data_type: kind.as_str().to_string(),
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::provider::{Canned, MemoryProvider};

    #[tokio::test]
    async fn unknown_series_is_rejected_before_querying() {
        let provider = Arc::new(MemoryProvider::new());
        let plane = QueryPlane::new(provider.clone());
        let err = plane.macro_data("m2", "").await.expect_err("m2 is unsupported");
        assert_eq!(err.to_string(), "unsupported data type: m2");
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn series_rows_carry_the_requested_type() {
        let query = VendorQuery::Macro {
            kind: MacroKind::Cpi,
            year: "2023".to_string(),
        };
        let provider = MemoryProvider::new().with_response(
            query,
            Canned::rows("statYear,statQuarter,dataValue", &[&["2023", "4", "0.2"], &["2023", "3", ""]]),
        );
        let plane = QueryPlane::new(Arc::new(provider));
        let points = plane.macro_data("cpi", "2023").await.expect("cpi rows");
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].data_type, "cpi");
        assert_eq!(points[0].data_value, Some(0.2));
        assert_eq!(points[1].data_value, None);
    }
}
