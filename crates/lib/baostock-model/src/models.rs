use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Basic listing information for a security.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockBasic {
    pub code: String,
    pub name: String,
    pub ipo_date: String,
    pub out_date: String,
    #[serde(rename = "type")]
    pub security_type: String,
    pub status: String,
    pub internal_ticker: String,
}

/// One daily k-line bar for a security.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyBar {
    pub date: String,
    pub code: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
    pub amount: Option<f64>,
    pub turnover: Option<f64>,
    pub internal_ticker: String,
}

/// Latest known price, synthesized from the most recent daily bar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSnapshot {
    pub date: String,
    pub code: String,
    pub price: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
    pub amount: Option<f64>,
    pub turnover: Option<f64>,
    pub internal_ticker: String,
}

impl From<DailyBar> for PriceSnapshot {
    fn from(bar: DailyBar) -> Self {
        Self {
            date: bar.date,
            code: bar.code,
            price: bar.close,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            amount: bar.amount,
            turnover: bar.turnover,
            internal_ticker: bar.internal_ticker,
        }
    }
}

/// Security matched by a keyword search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub code: String,
    pub name: String,
    pub internal_ticker: String,
}

/// First row of a financial statement query, keyed by vendor field name.
pub type StatementRow = Map<String, Value>;

/// Quarterly financial indicators grouped by statement category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialReport {
    pub year: i32,
    pub quarter: u32,
    pub code: String,
    pub internal_ticker: String,
    pub profitability: Option<StatementRow>,
    pub operation: Option<StatementRow>,
    pub growth: Option<StatementRow>,
    pub balance: Option<StatementRow>,
    pub cash_flow: Option<StatementRow>,
}

/// Calendar day with its trading flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TradeDay {
    pub calendar_date: String,
    pub is_trading_day: bool,
}

/// Dividend distribution record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dividend {
    pub code: String,
    pub divid_pre_tax: Option<f64>,
    pub divid_after_tax: Option<f64>,
    pub record_date: String,
    pub ex_dividend_date: String,
    pub dividend_date: String,
    pub dividend_year: String,
    pub internal_ticker: String,
}

/// Industry classification for a security.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndustryClass {
    pub update_date: String,
    pub code: String,
    pub code_name: String,
    pub industry: String,
    pub industry_classification: String,
    pub internal_ticker: String,
}

/// One k-line bar for an index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexBar {
    pub date: String,
    pub code: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
    pub amount: Option<f64>,
    pub internal_ticker: String,
}

/// One observation of a macro-economic series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MacroPoint {
    pub stat_year: String,
    pub stat_quarter: String,
    pub data_value: Option<f64>,
    pub data_type: String,
}

/// Index constituent with its weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Constituent {
    pub update_date: String,
    pub code: String,
    pub code_name: String,
    pub weight: Option<f64>,
    pub index_code: String,
    pub internal_ticker: String,
}

/// Price adjustment factors effective on a date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdjustFactor {
    pub date: String,
    pub code: String,
    pub fore_adjust_factor: Option<f64>,
    pub back_adjust_factor: Option<f64>,
    pub adjust_factor: Option<f64>,
    pub internal_ticker: String,
}

/// Quarterly performance express report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceExpress {
    pub code: String,
    pub ann_date: String,
    pub report_date: String,
    pub eps: Option<f64>,
    pub roe: Option<f64>,
    pub net_profit: Option<f64>,
    pub revenue: Option<f64>,
    pub internal_ticker: String,
}

/// Quarterly earnings forecast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Forecast {
    pub code: String,
    pub ann_date: String,
    pub forecast_type: String,
    pub forecast_content: String,
    pub profit_min: Option<f64>,
    pub profit_max: Option<f64>,
    pub last_year_profit: Option<f64>,
    pub forecast_date: String,
    pub internal_ticker: String,
}
