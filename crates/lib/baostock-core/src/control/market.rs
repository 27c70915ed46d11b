use baostock_model::schema::{
    ADJUST_FLAG_NONE,
    FREQUENCY_DAILY,
    KDATA_DAILY_FIELDS,
    KDATA_INDEX_FIELDS,
};
use baostock_model::ticker::{to_internal, to_vendor};
use baostock_model::{DailyBar, IndexBar, PriceSnapshot, TradeDay};
use chrono::Datelike;
use tracing::debug;

use crate::provider::{DataProvider, VendorQuery};

use super::{QueryError, QueryPlane, Row};

pub const NOT_FOUND_PRICE: &str = "no price data found";
pub const NOT_FOUND_TRADE_DATES: &str = "no trading calendar data found";
pub const NOT_FOUND_INDEX: &str = "no index data found";
pub const NOT_FOUND_SECURITY_LIST: &str = "no security list found";
pub const NOT_FOUND_DAILY_BARS: &str = "no daily bar data found";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn daily_query(code: String, start_date: String, end_date: String) -> VendorQuery {
    VendorQuery::KData {
        code,
        fields: KDATA_DAILY_FIELDS.to_string(),
        start_date,
        end_date,
        frequency: FREQUENCY_DAILY.to_string(),
        adjust_flag: ADJUST_FLAG_NONE.to_string(),
    }
}

/// Maps `date,code,open,high,low,close,volume,amount,turn`.
///
/// # Errors
/// Returns `QueryError::InvalidCell` for non-numeric price cells.
pub fn daily_bar(row: &Row) -> Result<DailyBar, QueryError> {
    Ok(DailyBar {
        date: row.text(0),
        code: row.text(1),
        open: row.float(2, "open")?,
        high: row.float(3, "high")?,
        low: row.float(4, "low")?,
        close: row.float(5, "close")?,
        volume: row.count(6, "volume")?,
        amount: row.float(7, "amount")?,
        turnover: row.float(8, "turnover")?,
        internal_ticker: to_internal(row.cell(1)),
    })
}

fn index_bar(row: &Row) -> Result<IndexBar, QueryError> {
    Ok(IndexBar {
        date: row.text(0),
        code: row.text(1),
        open: row.float(2, "open")?,
        high: row.float(3, "high")?,
        low: row.float(4, "low")?,
        close: row.float(5, "close")?,
        volume: row.count(6, "volume")?,
        amount: row.float(7, "amount")?,
        internal_ticker: to_internal(row.cell(1)),
    })
}

fn trade_day(row: &Row) -> Result<TradeDay, QueryError> {
    Ok(TradeDay {
        calendar_date: row.text(0),
        is_trading_day: row.flag(1, "is_trading_day")?,
    })
}

impl<P: DataProvider> QueryPlane<P> {
    /// Daily bars for a security between two dates.
    ///
    /// # Errors
    /// Returns `QueryError` if the vendor rejects the query, returns no rows,
    /// or a cell cannot be coerced.
    pub async fn daily_price(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<DailyBar>, QueryError> {
        let query = daily_query(to_vendor(code), start_date.to_string(), end_date.to_string());
        self.collect(query, NOT_FOUND_PRICE, daily_bar).await
    }

    /// Latest daily bar from the first day of the current month through today.
    ///
    /// # Errors
    /// Returns `QueryError` if the vendor rejects the query or the month has no bars.
    pub async fn latest_price(&self, code: &str) -> Result<PriceSnapshot, QueryError> {
        let today = self.today();
        let month_start = today.with_day(1).unwrap_or(today);
        let query = daily_query(
            to_vendor(code),
            month_start.format(DATE_FORMAT).to_string(),
            today.format(DATE_FORMAT).to_string(),
        );
        let table = self.fetch(query, NOT_FOUND_PRICE).await?;
        let last = table
            .rows
            .last()
            .ok_or(QueryError::NotFound(NOT_FOUND_PRICE))?;
        daily_bar(last).map(PriceSnapshot::from)
    }

    /// Index bars at the requested frequency (`d`, `w`, `m`).
    ///
    /// # Errors
    /// Returns `QueryError` if the vendor rejects the query, returns no rows,
    /// or a cell cannot be coerced.
    pub async fn index_data(
        &self,
        index_code: &str,
        start_date: &str,
        end_date: &str,
        frequency: &str,
    ) -> Result<Vec<IndexBar>, QueryError> {
        let query = VendorQuery::KData {
            code: to_vendor(index_code),
            fields: KDATA_INDEX_FIELDS.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            frequency: frequency.to_string(),
            adjust_flag: ADJUST_FLAG_NONE.to_string(),
        };
        self.collect(query, NOT_FOUND_INDEX, index_bar).await
    }

    /// Trading calendar between two dates.
    ///
    /// # Errors
    /// Returns `QueryError` if the vendor rejects the query or returns no rows.
    pub async fn trade_dates(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<TradeDay>, QueryError> {
        let query = VendorQuery::TradeDates {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        };
        self.collect(query, NOT_FOUND_TRADE_DATES, trade_day).await
    }

    /// Daily bar on `date` for the first `limit` listed securities.
    ///
    /// Securities are queried one after another. A security whose query fails
    /// or returns nothing is left out of the result.
    ///
    /// # Errors
    /// Returns `QueryError` if the security list cannot be fetched or no
    /// security produced a bar.
    pub async fn all_stocks_daily_price(
        &self,
        date: &str,
        limit: usize,
    ) -> Result<Vec<DailyBar>, QueryError> {
        let listing = VendorQuery::AllStock {
            day: date.to_string(),
        };
        let table = self.fetch(listing, NOT_FOUND_SECURITY_LIST).await?;
        let codes: Vec<String> = table.rows.iter().take(limit).map(|row| row.text(0)).collect();

        let mut bars = Vec::with_capacity(codes.len());
        for code in codes {
            let query = daily_query(code.clone(), date.to_string(), date.to_string());
            let bar = match self.fetch(query, NOT_FOUND_PRICE).await {
                Ok(table) => table.rows.first().map(daily_bar).transpose(),
                Err(err) => Err(err),
            };
            match bar {
                Ok(Some(bar)) => bars.push(bar),
                Ok(None) => {}
                Err(err) => debug!(code = %code, error = %err, "skipping security"),
            }
        }

        if bars.is_empty() {
            return Err(QueryError::NotFound(NOT_FOUND_DAILY_BARS));
        }
        Ok(bars)
    }
}
