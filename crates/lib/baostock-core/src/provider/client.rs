//! TCP client for the Baostock query service.

use std::time::Duration;

use baostock_model::schema::{
    FIELDS_ADJUST_FACTOR,
    FIELDS_ALL_STOCK,
    FIELDS_BALANCE,
    FIELDS_CASH_FLOW,
    FIELDS_DIVIDEND,
    FIELDS_FORECAST,
    FIELDS_GROWTH,
    FIELDS_INDEX_CONSTITUENTS,
    FIELDS_OPERATION,
    FIELDS_PERFORMANCE_EXPRESS,
    FIELDS_PROFIT,
    FIELDS_STOCK_BASIC,
    FIELDS_STOCK_INDUSTRY,
    FIELDS_TRADE_DATES,
    split_fields,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::wire::{self, ResponseFrame, WireError};
use super::{
    BufferedCursor,
    DataProvider,
    FinancialKind,
    IndexKind,
    ProviderError,
    ResponseStatus,
    VendorQuery,
};

pub const DEFAULT_SERVER_ADDR: &str = "public-api.baostock.com:10030";
pub const DEFAULT_USER_ID: &str = "anonymous";
pub const DEFAULT_PASSWORD: &str = "123456";
const DEFAULT_MAX_FRAME_BYTES: usize = 256 * 1024 * 1024;
const READ_CHUNK_BYTES: usize = 8192;

/// Connection settings for [`BaostockClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub addr: String,
    pub user_id: String,
    pub password: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_frame_bytes: usize,
}

impl ClientConfig {
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            user_id: DEFAULT_USER_ID.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, user_id: impl Into<String>, password: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self.password = password.into();
        self
    }

    #[must_use]
    pub const fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Upper bound on a single response frame.
    #[must_use]
    pub const fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_ADDR)
    }
}

struct Connection {
    stream: TcpStream,
    user_id: Option<String>,
    /// Set while a request is unanswered. A connection left in this state
    /// may still deliver a stale frame, so it is replaced before reuse.
    broken: bool,
}

/// Baostock client speaking the vendor's line protocol over one socket.
///
/// Exchanges are serialized: one request is in flight at a time.
pub struct BaostockClient {
    config: ClientConfig,
    conn: Mutex<Connection>,
}

impl BaostockClient {
    /// Opens the TCP connection. Call [`DataProvider::login`] before querying.
    ///
    /// # Errors
    /// Returns `ProviderError` if the connection cannot be established in time.
    pub async fn connect(config: ClientConfig) -> Result<Self, ProviderError> {
        let stream = open_stream(&config).await?;
        info!(addr = %config.addr, "connected to baostock");
        Ok(Self {
            config,
            conn: Mutex::new(Connection {
                stream,
                user_id: None,
                broken: false,
            }),
        })
    }

    async fn exchange(
        &self,
        conn: &mut Connection,
        msg_type: &str,
        body: &[&str],
    ) -> Result<ResponseFrame, ProviderError> {
        let request = wire::encode_request(msg_type, body);
        let max_frame_bytes = self.config.max_frame_bytes;
        conn.broken = true;
        let round_trip = async {
            conn.stream.write_all(&request).await?;
            conn.stream.flush().await?;
            read_frame(&mut conn.stream, max_frame_bytes).await
        };
        let raw = tokio::time::timeout(self.config.request_timeout, round_trip)
            .await
            .map_err(|_| ProviderError::Timeout)??;
        let frame = wire::decode_response(&raw)?;
        conn.broken = false;
        Ok(frame)
    }

    /// Replaces a connection left mid-exchange and restores the login it had.
    async fn recover(&self, conn: &mut Connection) -> Result<(), ProviderError> {
        warn!(addr = %self.config.addr, "vendor connection out of step, reconnecting");
        conn.stream = open_stream(&self.config).await?;
        conn.broken = false;
        if conn.user_id.take().is_some() {
            let status = self.sign_in(conn).await?;
            if !status.is_success() {
                return Err(ProviderError::Other(format!(
                    "vendor rejected login after reconnect: {}",
                    status.message
                )));
            }
        }
        Ok(())
    }

    async fn sign_in(&self, conn: &mut Connection) -> Result<ResponseStatus, ProviderError> {
        let body = [
            "login",
            self.config.user_id.as_str(),
            self.config.password.as_str(),
            "0",
        ];
        let frame = self.exchange(conn, wire::MSG_LOGIN_REQUEST, &body).await?;
        let status = frame.status();
        if status.is_success() {
            let user_id = frame
                .field(wire::BODY_USER_ID)
                .filter(|value| !value.is_empty())
                .unwrap_or(self.config.user_id.as_str())
                .to_string();
            info!(user_id = %user_id, "baostock login succeeded");
            conn.user_id = Some(user_id);
        }
        Ok(status)
    }
}

async fn open_stream(config: &ClientConfig) -> Result<TcpStream, ProviderError> {
    let stream = tokio::time::timeout(config.connect_timeout, TcpStream::connect(&config.addr))
        .await
        .map_err(|_| ProviderError::Timeout)??;
    stream.set_nodelay(true)?;
    Ok(stream)
}

async fn read_frame(stream: &mut TcpStream, max_frame_bytes: usize) -> Result<Vec<u8>, ProviderError> {
    let mut buffer = Vec::with_capacity(READ_CHUNK_BYTES);
    let mut chunk = [0_u8; READ_CHUNK_BYTES];
    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Err(ProviderError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "vendor closed the connection",
            )));
        }
        buffer.extend_from_slice(&chunk[..read]);
        if buffer.len() > max_frame_bytes {
            return Err(WireError::Oversized(buffer.len()).into());
        }
        if wire::is_complete(&buffer) {
            return Ok(buffer);
        }
    }
}

/// Method name, message type, parameters, and columns of a vendor request.
struct Request {
    msg_type: &'static str,
    method: &'static str,
    params: Vec<String>,
    fields: String,
}

impl Request {
    fn new(msg_type: &'static str, method: &'static str, params: Vec<String>, fields: &str) -> Self {
        Self {
            msg_type,
            method,
            params,
            fields: fields.to_string(),
        }
    }

    fn body(&self, user_id: &str, page: usize) -> Vec<String> {
        let mut body = vec![
            self.method.to_string(),
            user_id.to_string(),
            page.to_string(),
            wire::PER_PAGE_COUNT.to_string(),
        ];
        body.extend(self.params.iter().cloned());
        body
    }
}

fn build_request(query: &VendorQuery) -> Result<Request, ProviderError> {
    let request = match query {
        VendorQuery::StockBasic { code } => Request::new(
            wire::MSG_STOCK_BASIC_REQUEST,
            "query_stock_basic",
            vec![code.clone(), String::new()],
            FIELDS_STOCK_BASIC,
        ),
        VendorQuery::KData {
            code,
            fields,
            start_date,
            end_date,
            frequency,
            adjust_flag,
        } => Request::new(
            wire::MSG_KDATA_PLUS_REQUEST,
            "query_history_k_data_plus",
            vec![
                code.clone(),
                fields.clone(),
                start_date.clone(),
                end_date.clone(),
                frequency.clone(),
                adjust_flag.clone(),
            ],
            fields,
        ),
        VendorQuery::AllStock { day } => Request::new(
            wire::MSG_ALL_STOCK_REQUEST,
            "query_all_stock",
            vec![day.clone()],
            FIELDS_ALL_STOCK,
        ),
        VendorQuery::Financial {
            kind,
            code,
            year,
            quarter,
        } => {
            let (msg_type, method, fields) = match kind {
                FinancialKind::Profit => (wire::MSG_PROFIT_REQUEST, "query_profit_data", FIELDS_PROFIT),
                FinancialKind::Operation => (
                    wire::MSG_OPERATION_REQUEST,
                    "query_operation_data",
                    FIELDS_OPERATION,
                ),
                FinancialKind::Growth => (wire::MSG_GROWTH_REQUEST, "query_growth_data", FIELDS_GROWTH),
                FinancialKind::Balance => (
                    wire::MSG_BALANCE_REQUEST,
                    "query_balance_data",
                    FIELDS_BALANCE,
                ),
                FinancialKind::CashFlow => (
                    wire::MSG_CASH_FLOW_REQUEST,
                    "query_cash_flow_data",
                    FIELDS_CASH_FLOW,
                ),
            };
            Request::new(
                msg_type,
                method,
                vec![code.clone(), year.to_string(), quarter.to_string()],
                fields,
            )
        }
        VendorQuery::TradeDates {
            start_date,
            end_date,
        } => Request::new(
            wire::MSG_TRADE_DATES_REQUEST,
            "query_trade_dates",
            vec![start_date.clone(), end_date.clone()],
            FIELDS_TRADE_DATES,
        ),
        VendorQuery::Dividend {
            code,
            year,
            year_type,
        } => Request::new(
            wire::MSG_DIVIDEND_REQUEST,
            "query_dividend_data",
            vec![code.clone(), year.clone(), year_type.clone()],
            FIELDS_DIVIDEND,
        ),
        VendorQuery::Industry { code } => Request::new(
            wire::MSG_STOCK_INDUSTRY_REQUEST,
            "query_stock_industry",
            vec![code.clone(), String::new()],
            FIELDS_STOCK_INDUSTRY,
        ),
        VendorQuery::Macro { kind, .. } => {
            return Err(ProviderError::Unsupported(format!("{kind} series")));
        }
        VendorQuery::Constituents { index, date } => {
            let (msg_type, method) = match index {
                IndexKind::Hs300 => (wire::MSG_HS300_REQUEST, "query_hs300_stocks"),
                IndexKind::Sz50 => (wire::MSG_SZ50_REQUEST, "query_sz50_stocks"),
                IndexKind::Zz500 => (wire::MSG_ZZ500_REQUEST, "query_zz500_stocks"),
            };
            Request::new(msg_type, method, vec![date.clone()], FIELDS_INDEX_CONSTITUENTS)
        }
        VendorQuery::AdjustFactor {
            code,
            start_date,
            end_date,
        } => Request::new(
            wire::MSG_ADJUST_FACTOR_REQUEST,
            "query_adjust_factor",
            vec![code.clone(), start_date.clone(), end_date.clone()],
            FIELDS_ADJUST_FACTOR,
        ),
        VendorQuery::PerformanceExpress {
            code,
            start_date,
            end_date,
        } => Request::new(
            wire::MSG_PERFORMANCE_EXPRESS_REQUEST,
            "query_performance_express_report",
            vec![code.clone(), start_date.clone(), end_date.clone()],
            FIELDS_PERFORMANCE_EXPRESS,
        ),
        VendorQuery::Forecast {
            code,
            start_date,
            end_date,
        } => Request::new(
            wire::MSG_FORECAST_REQUEST,
            "query_forecast_report",
            vec![code.clone(), start_date.clone(), end_date.clone()],
            FIELDS_FORECAST,
        ),
    };
    Ok(request)
}

impl DataProvider for BaostockClient {
    type Cursor = BufferedCursor;

    async fn login(&self) -> Result<ResponseStatus, ProviderError> {
        let mut conn = self.conn.lock().await;
        if conn.broken {
            conn.user_id = None;
            self.recover(&mut conn).await?;
        }
        self.sign_in(&mut conn).await
    }

    async fn logout(&self) -> Result<(), ProviderError> {
        let mut conn = self.conn.lock().await;
        let Some(user_id) = conn.user_id.take() else {
            return Ok(());
        };
        if conn.broken {
            debug!("skipping logout on a connection left mid-exchange");
            return Ok(());
        }
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S").to_string();
        let frame = self
            .exchange(&mut conn, wire::MSG_LOGOUT_REQUEST, &["logout", user_id.as_str(), stamp.as_str()])
            .await?;
        let status = frame.status();
        if !status.is_success() {
            debug!(code = %status.code, message = %status.message, "baostock logout rejected");
        }
        Ok(())
    }

    async fn query(&self, query: VendorQuery) -> Result<BufferedCursor, ProviderError> {
        let request = build_request(&query)?;
        let mut conn = self.conn.lock().await;
        if conn.user_id.is_none() {
            return Err(ProviderError::NotLoggedIn);
        }
        if conn.broken {
            self.recover(&mut conn).await?;
        }
        let user_id = conn.user_id.clone().ok_or(ProviderError::NotLoggedIn)?;

        let mut rows = Vec::new();
        let mut page = 1_usize;
        loop {
            let body = request.body(&user_id, page);
            let body: Vec<&str> = body.iter().map(String::as_str).collect();
            let frame = self.exchange(&mut conn, request.msg_type, &body).await?;
            let status = frame.status();
            if !status.is_success() {
                if page == 1 {
                    debug!(query = query.name(), code = %status.code, "vendor rejected query");
                    return Ok(BufferedCursor::failed(status));
                }
                debug!(query = query.name(), page, "stopping pagination on vendor status");
                break;
            }

            let page_rows = wire::parse_records(frame.field(wire::BODY_DATA).unwrap_or_default())?;
            let per_page = frame
                .field(wire::BODY_PER_PAGE)
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(wire::PER_PAGE_COUNT);
            let full_page = !page_rows.is_empty() && page_rows.len() >= per_page;
            rows.extend(page_rows);
            if !full_page {
                break;
            }
            page += 1;
        }

        debug!(query = query.name(), rows = rows.len(), pages = page, "vendor query drained");
        Ok(BufferedCursor::new(
            ResponseStatus::success(),
            split_fields(&request.fields),
            rows,
        ))
    }
}
