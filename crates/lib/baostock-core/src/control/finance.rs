use baostock_model::ticker::{to_internal, to_vendor};
use baostock_model::{FinancialReport, Forecast, PerformanceExpress, StatementRow};
use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::provider::{DataProvider, FinancialKind, ProviderError, RowCursor, VendorQuery};

use super::{drain, QueryError, QueryPlane, Row};

pub const NOT_FOUND_PERFORMANCE_EXPRESS: &str = "no performance express data found";
pub const NOT_FOUND_FORECAST: &str = "no forecast data found";

/// Resolves the reporting period for a financial query.
///
/// When either part is missing the period defaults to the quarter containing
/// `today`. During the first fourteen days of a quarter the previous quarter is
/// used instead.
#[must_use]
pub fn resolve_period(year: Option<i32>, quarter: Option<u32>, today: NaiveDate) -> (i32, u32) {
    if let (Some(year), Some(quarter)) = (year, quarter) {
        return (year, quarter);
    }
    let mut year = today.year();
    let mut quarter = today.month0() / 3 + 1;
    if today.month() % 3 == 1 && today.day() < 15 {
        quarter -= 1;
        if quarter == 0 {
            quarter = 4;
            year -= 1;
        }
    }
    (year, quarter)
}

fn performance_express(row: &Row) -> Result<PerformanceExpress, QueryError> {
    Ok(PerformanceExpress {
        code: row.text(0),
        ann_date: row.text(1),
        report_date: row.text(2),
        eps: row.float(3, "eps")?,
        roe: row.float(4, "roe")?,
        net_profit: row.float(5, "net_profit")?,
        revenue: row.float(6, "revenue")?,
        internal_ticker: to_internal(row.cell(0)),
    })
}

fn forecast(row: &Row) -> Result<Forecast, QueryError> {
    Ok(Forecast {
        code: row.text(0),
        ann_date: row.text(1),
        forecast_type: row.text(2),
        forecast_content: row.text(3),
        profit_min: row.float(4, "profit_min")?,
        profit_max: row.float(5, "profit_max")?,
        last_year_profit: row.float(6, "last_year_profit")?,
        forecast_date: row.text(7),
        internal_ticker: to_internal(row.cell(0)),
    })
}

impl<P: DataProvider> QueryPlane<P> {
    /// Quarterly indicators from the five statement categories.
    ///
    /// A category the vendor rejects or leaves empty is reported as absent
    /// rather than failing the whole report.
    ///
    /// # Errors
    /// Returns `QueryError::Provider` when the vendor cannot be reached.
    pub async fn financial_data(
        &self,
        code: &str,
        year: Option<i32>,
        quarter: Option<u32>,
    ) -> Result<FinancialReport, QueryError> {
        let (year, quarter) = resolve_period(year, quarter, self.today());
        let code = to_vendor(code);

        let mut statements: Vec<Option<StatementRow>> = Vec::with_capacity(FinancialKind::ALL.len());
        for kind in FinancialKind::ALL {
            let query = VendorQuery::Financial {
                kind,
                code: code.clone(),
                year,
                quarter,
            };
            statements.push(self.first_statement(query).await?);
        }

        let mut statements = statements.into_iter();
        let mut next = || statements.next().flatten();
        Ok(FinancialReport {
            year,
            quarter,
            internal_ticker: to_internal(&code),
            code,
            profitability: next(),
            operation: next(),
            growth: next(),
            balance: next(),
            cash_flow: next(),
        })
    }

    async fn first_statement(&self, query: VendorQuery) -> Result<Option<StatementRow>, ProviderError> {
        let name = query.name();
        let mut cursor = self.provider().query(query).await?;
        if !cursor.status().is_success() {
            debug!(query = name, message = %cursor.status().message, "statement unavailable");
            return Ok(None);
        }
        let table = match drain(&mut cursor) {
            Ok(table) => table,
            Err(QueryError::Provider(err)) => return Err(err),
            Err(err) => {
                debug!(query = name, error = %err, "statement unreadable");
                return Ok(None);
            }
        };
        Ok(table.rows.first().map(|row| row.to_object(&table.fields)))
    }

    /// Performance express reports published between two dates.
    ///
    /// # Errors
    /// Returns `QueryError` if the vendor rejects the query, returns no rows,
    /// or a cell cannot be coerced.
    pub async fn performance_express(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<PerformanceExpress>, QueryError> {
        let query = VendorQuery::PerformanceExpress {
            code: to_vendor(code),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        };
        self.collect(query, NOT_FOUND_PERFORMANCE_EXPRESS, performance_express)
            .await
    }

    /// Earnings forecasts published between two dates.
    ///
    /// # Errors
    /// Returns `QueryError` if the vendor rejects the query, returns no rows,
    /// or a cell cannot be coerced.
    pub async fn forecast(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<Forecast>, QueryError> {
        let query = VendorQuery::Forecast {
            code: to_vendor(code),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        };
        self.collect(query, NOT_FOUND_FORECAST, forecast).await
    }
}
