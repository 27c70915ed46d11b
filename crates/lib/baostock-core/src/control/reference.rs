use baostock_model::schema::{FIELD_CODE, FIELD_CODE_NAME};
use baostock_model::ticker::{to_internal, to_vendor};
use baostock_model::{AdjustFactor, Constituent, Dividend, IndustryClass, SearchHit, StockBasic};

use crate::provider::{DataProvider, IndexKind, VendorQuery};

use super::{QueryError, QueryPlane, Row};

pub const NOT_FOUND_STOCK_BASIC: &str = "no stock information found";
pub const NOT_FOUND_STOCKS: &str = "no stock data found";
pub const NOT_FOUND_DIVIDEND: &str = "no dividend data found";
pub const NOT_FOUND_INDUSTRY: &str = "no industry classification data found";
pub const NOT_FOUND_CONSTITUENTS: &str = "no constituent data found";
pub const NOT_FOUND_ADJUST_FACTOR: &str = "no adjust factor data found";

fn stock_basic(row: &Row) -> StockBasic {
    StockBasic {
        code: row.text(0),
        name: row.text(1),
        ipo_date: row.text(2),
        out_date: row.text(3),
        security_type: row.text(4),
        status: row.text(5),
        internal_ticker: to_internal(row.cell(0)),
    }
}

fn dividend(row: &Row) -> Result<Dividend, QueryError> {
    Ok(Dividend {
        code: row.text(0),
        divid_pre_tax: row.float(1, "divid_pre_tax")?,
        divid_after_tax: row.float(2, "divid_after_tax")?,
        record_date: row.text(3),
        ex_dividend_date: row.text(4),
        dividend_date: row.text(5),
        dividend_year: row.text(6),
        internal_ticker: to_internal(row.cell(0)),
    })
}

fn industry(row: &Row) -> IndustryClass {
    IndustryClass {
        update_date: row.text(0),
        code: row.text(1),
        code_name: row.text(2),
        industry: row.text(3),
        industry_classification: row.text(4),
        internal_ticker: to_internal(row.cell(1)),
    }
}

fn adjust_factor(row: &Row) -> Result<AdjustFactor, QueryError> {
    Ok(AdjustFactor {
        date: row.text(0),
        code: row.text(1),
        fore_adjust_factor: row.float(2, "fore_adjust_factor")?,
        back_adjust_factor: row.float(3, "back_adjust_factor")?,
        adjust_factor: row.float(4, "adjust_factor")?,
        internal_ticker: to_internal(row.cell(1)),
    })
}

fn matches_keyword(value: &str, keyword: &str) -> bool {
    value.to_lowercase().contains(keyword)
}

impl<P: DataProvider> QueryPlane<P> {
    /// Listing information for one security, or for all when `code` is empty.
    ///
    /// # Errors
    /// Returns `QueryError` if the vendor rejects the query or returns no rows.
    pub async fn stock_basic(&self, code: &str) -> Result<Vec<StockBasic>, QueryError> {
        let query = VendorQuery::StockBasic {
            code: to_vendor(code),
        };
        self.collect(query, NOT_FOUND_STOCK_BASIC, |row: &Row| Ok(stock_basic(row)))
            .await
    }

    /// Securities listed today whose name or code contains `keyword`,
    /// ignoring case. At most `limit` hits are returned.
    ///
    /// # Errors
    /// Returns `QueryError` if today's listing cannot be fetched or lacks the
    /// code and name columns.
    pub async fn search_stocks(
        &self,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, QueryError> {
        let today = self.today().format("%Y-%m-%d").to_string();
        let table = self
            .fetch(VendorQuery::AllStock { day: today }, NOT_FOUND_STOCKS)
            .await?;
        let code_column = table.column(FIELD_CODE)?;
        let name_column = table.column(FIELD_CODE_NAME)?;
        let keyword = keyword.to_lowercase();

        Ok(table
            .rows
            .iter()
            .filter(|row| {
                matches_keyword(row.cell(name_column), &keyword)
                    || matches_keyword(row.cell(code_column), &keyword)
            })
            .take(limit)
            .map(|row| SearchHit {
                code: row.text(code_column),
                name: row.text(name_column),
                internal_ticker: to_internal(row.cell(code_column)),
            })
            .collect())
    }

    /// Dividend records for a security.
    ///
    /// # Errors
    /// Returns `QueryError` if the vendor rejects the query, returns no rows,
    /// or a cell cannot be coerced.
    pub async fn dividend_data(
        &self,
        code: &str,
        year: &str,
        year_type: &str,
    ) -> Result<Vec<Dividend>, QueryError> {
        let query = VendorQuery::Dividend {
            code: to_vendor(code),
            year: year.to_string(),
            year_type: year_type.to_string(),
        };
        self.collect(query, NOT_FOUND_DIVIDEND, dividend).await
    }

    /// Industry classification for one security, or for all when `code` is empty.
    ///
    /// # Errors
    /// Returns `QueryError` if the vendor rejects the query or returns no rows.
    pub async fn stock_industry(&self, code: &str) -> Result<Vec<IndustryClass>, QueryError> {
        let query = VendorQuery::Industry {
            code: to_vendor(code),
        };
        self.collect(query, NOT_FOUND_INDUSTRY, |row: &Row| Ok(industry(row)))
            .await
    }

    /// # Errors
    /// Returns `QueryError` if the vendor rejects the query, returns no rows,
    /// or a cell cannot be coerced.
    pub async fn adjust_factor(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<AdjustFactor>, QueryError> {
        let query = VendorQuery::AdjustFactor {
            code: to_vendor(code),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        };
        self.collect(query, NOT_FOUND_ADJUST_FACTOR, adjust_factor).await
    }

    /// Constituents of `hs300`, `zz500` or `sz50` as of `date`.
    ///
    /// # Errors
    /// Returns `QueryError::UnsupportedIndex` for any other index name, and
    /// `QueryError` if the vendor rejects the query or returns no rows.
    pub async fn index_constituents(
        &self,
        index_code: &str,
        date: &str,
    ) -> Result<Vec<Constituent>, QueryError> {
        let index: IndexKind = index_code.parse().map_err(QueryError::UnsupportedIndex)?;
        let query = VendorQuery::Constituents {
            index,
            date: date.to_string(),
        };
        self.collect(query, NOT_FOUND_CONSTITUENTS, |row: &Row| {
            Ok(Constituent {
                update_date: row.text(0),
                code: row.text(1),
                code_name: row.text(2),
                weight: row.float(3, "weight")?,
                index_code: index.as_str().to_string(),
                internal_ticker: to_internal(row.cell(1)),
            })
        })
        .await
    }
}
