use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use baostock_core::control::QueryPlane;
use baostock_core::provider::wire::{CLIENT_VERSION, HEADER_LENGTH, MESSAGE_SPLIT, TERMINATOR};
use baostock_core::provider::{
    BaostockClient,
    ClientConfig,
    DataProvider,
    ProviderError,
    RowCursor,
    VendorQuery,
    WireError,
};
use baostock_core::services::VendorSession;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

fn frame(msg_type: &str, body: &str) -> Vec<u8> {
    let mut raw = format!("{CLIENT_VERSION}{MESSAGE_SPLIT}{msg_type}{MESSAGE_SPLIT}{:010}", body.len())
        .into_bytes();
    raw.extend_from_slice(body.as_bytes());
    raw.extend_from_slice(TERMINATOR);
    raw
}

fn compressed_frame(body: &str) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body.as_bytes()).expect("compress body");
    let compressed = encoder.finish().expect("finish compression");
    let mut raw = format!("{CLIENT_VERSION}{MESSAGE_SPLIT}96{MESSAGE_SPLIT}{:010}", compressed.len())
        .into_bytes();
    raw.extend_from_slice(&compressed);
    raw.extend_from_slice(TERMINATOR);
    raw
}

fn body(fields: &[&str]) -> String {
    fields.join(&MESSAGE_SPLIT.to_string())
}

/// One request line as seen by the fake vendor.
#[derive(Debug, Clone)]
struct Seen {
    msg_type: String,
    fields: Vec<String>,
}

impl Seen {
    fn page(&self) -> &str {
        self.fields.get(2).map_or("", String::as_str)
    }
}

type Log = Arc<Mutex<Vec<Seen>>>;
type Respond = fn(&Seen) -> (Vec<u8>, Duration);

/// Answers requests by message type. Used by the session tests.
fn standard_reply(request: &Seen) -> (Vec<u8>, Duration) {
    let response = match request.msg_type.as_str() {
        "00" => frame("01", &body(&["0", "success", "login", "anonymous"])),
        "02" => frame("03", &body(&["0", "success", "logout", "anonymous"])),
        "35" => frame(
            "36",
            &body(&[
                "0",
                "success",
                "query_all_stock",
                "anonymous",
                request.page(),
                "10000",
                r#"{"record":[["sh.600000","1","浦发银行"],["sz.000001","1","平安银行"]]}"#,
            ]),
        ),
        "95" => compressed_frame(&body(&[
            "0",
            "success",
            "query_history_k_data_plus",
            "anonymous",
            "1",
            "10000",
            r#"{"record":[["2024-03-01","sh.600000","7.1","7.3","7.0","7.2","123456.0","889900.5","0.12"]]}"#,
        ])),
        "45" => frame(
            "46",
            &body(&["10004011", "invalid stock code", "query_stock_basic", "anonymous"]),
        ),
        "59" => frame(
            "60",
            &body(&[
                "0",
                "success",
                "query_stock_industry",
                "anonymous",
                "1",
                "10000",
                r#"{"record":[["2024-03-04","sz.000001","平安银行","J66货币金融服务","申万一级行业"]]}"#,
            ]),
        ),
        _ => frame("04", &body(&["10000001", "unknown request"])),
    };
    (response, Duration::ZERO)
}

/// Same as [`standard_reply`], but the security listing arrives late.
fn slow_listing_reply(request: &Seen) -> (Vec<u8>, Duration) {
    let (response, _) = standard_reply(request);
    if request.msg_type == "35" {
        return (response, Duration::from_millis(800));
    }
    (response, Duration::ZERO)
}

/// Pages of two rows: trade dates span two pages, dividends fail on page two.
fn paged_reply(request: &Seen) -> (Vec<u8>, Duration) {
    let page = request.page();
    let response = match (request.msg_type.as_str(), page) {
        ("00", _) => frame("01", &body(&["0", "success", "login", "anonymous"])),
        ("33", "1") => frame(
            "34",
            &body(&[
                "0",
                "success",
                "query_trade_dates",
                "anonymous",
                "1",
                "2",
                r#"{"record":[["2024-03-01","1"],["2024-03-02","0"]]}"#,
            ]),
        ),
        ("33", _) => frame(
            "34",
            &body(&[
                "0",
                "success",
                "query_trade_dates",
                "anonymous",
                page,
                "2",
                r#"{"record":[["2024-03-04","1"]]}"#,
            ]),
        ),
        ("13", "1") => frame(
            "14",
            &body(&[
                "0",
                "success",
                "query_dividend_data",
                "anonymous",
                "1",
                "2",
                r#"{"record":[["sh.600000","2024-01-05"],["sh.600000","2024-06-05"]]}"#,
            ]),
        ),
        ("13", _) => frame(
            "14",
            &body(&["10002007", "network error", "query_dividend_data", "anonymous"]),
        ),
        _ => frame("04", &body(&["10000001", "unknown request"])),
    };
    (response, Duration::ZERO)
}

async fn serve_connection(socket: TcpStream, respond: Respond, log: Log) {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let request = Seen {
            msg_type: line.get(8..10).unwrap_or_default().to_string(),
            fields: line
                .get(HEADER_LENGTH..)
                .unwrap_or_default()
                .split(MESSAGE_SPLIT)
                .map(str::to_string)
                .collect(),
        };
        let (response, delay) = respond(&request);
        log.lock().expect("request log").push(request);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if writer.write_all(&response).await.is_err() {
            break;
        }
    }
}

/// Accepts connections until the test ends, logging every request.
async fn start_with(respond: Respond, request_timeout: Duration) -> (ClientConfig, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake vendor");
    let addr = listener.local_addr().expect("local addr");
    let log: Log = Arc::default();
    let accept_log = log.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(serve_connection(socket, respond, accept_log.clone()));
        }
    });
    let config = ClientConfig::new(addr.to_string()).with_request_timeout(request_timeout);
    (config, log)
}

async fn start() -> (ClientConfig, Log) {
    start_with(standard_reply, Duration::from_secs(5)).await
}

fn msg_types(log: &Log) -> Vec<String> {
    log.lock()
        .expect("request log")
        .iter()
        .map(|seen| seen.msg_type.clone())
        .collect()
}

#[tokio::test]
async fn session_round_trip_over_tcp() {
    let (config, log) = start().await;
    let client = BaostockClient::connect(config).await.expect("connect");
    let session = VendorSession::establish(client).await.expect("login");
    let plane: QueryPlane<BaostockClient> = session.control();

    let hits = plane.search_stocks("平安", 10).await.expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].code, "sz.000001");
    assert_eq!(hits[0].internal_ticker, "SZSE:000001");

    let bars = plane
        .daily_price("SSE:600000", "2024-03-01", "2024-03-01")
        .await
        .expect("daily bars");
    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0].volume, Some(123_456));
    assert_eq!(bars[0].close, Some(7.2));

    let err = plane.stock_basic("sh.999999").await.expect_err("vendor rejects");
    assert_eq!(err.to_string(), "query failed: invalid stock code");

    session.release().await;
    assert_eq!(msg_types(&log), vec!["00", "35", "95", "45", "02"]);
}

#[tokio::test]
async fn query_before_login_is_refused() {
    let (config, _log) = start().await;
    let client = BaostockClient::connect(config).await.expect("connect");
    let err = client
        .query(VendorQuery::AllStock {
            day: "2024-03-01".to_string(),
        })
        .await
        .expect_err("not logged in");
    assert!(matches!(err, ProviderError::NotLoggedIn));
}

#[tokio::test]
async fn late_reply_is_not_read_as_the_next_answer() {
    let (config, log) = start_with(slow_listing_reply, Duration::from_millis(300)).await;
    let client = BaostockClient::connect(config).await.expect("connect");
    let session = VendorSession::establish(client).await.expect("login");
    let plane: QueryPlane<BaostockClient> = session.control();

    let err = plane
        .search_stocks("平安", 10)
        .await
        .expect_err("listing times out");
    assert_eq!(err.to_string(), "vendor request timed out");

    let industry = plane.stock_industry("sz.000001").await.expect("industry");
    assert_eq!(industry.len(), 1);
    assert_eq!(industry[0].code, "sz.000001");
    assert_eq!(industry[0].industry, "J66货币金融服务");

    // The second login is the reconnect.
    assert_eq!(msg_types(&log), vec!["00", "35", "00", "59"]);
}

#[tokio::test]
async fn full_pages_request_the_next_page() {
    let (config, log) = start_with(paged_reply, Duration::from_secs(5)).await;
    let client = BaostockClient::connect(config).await.expect("connect");
    client.login().await.expect("login");

    let mut cursor = client
        .query(VendorQuery::TradeDates {
            start_date: "2024-03-01".to_string(),
            end_date: "2024-03-04".to_string(),
        })
        .await
        .expect("trade dates");
    assert!(cursor.status().is_success());
    let mut days = Vec::new();
    while let Some(row) = cursor.next_row().expect("row") {
        days.push(row[0].clone());
    }
    assert_eq!(days, vec!["2024-03-01", "2024-03-02", "2024-03-04"]);

    let pages: Vec<String> = log
        .lock()
        .expect("request log")
        .iter()
        .filter(|seen| seen.msg_type == "33")
        .map(|seen| seen.page().to_string())
        .collect();
    assert_eq!(pages, vec!["1", "2"]);
}

#[tokio::test]
async fn failed_later_page_keeps_earlier_rows() {
    let (config, log) = start_with(paged_reply, Duration::from_secs(5)).await;
    let client = BaostockClient::connect(config).await.expect("connect");
    client.login().await.expect("login");

    let cursor = client
        .query(VendorQuery::Dividend {
            code: "sh.600000".to_string(),
            year: "2024".to_string(),
            year_type: "report".to_string(),
        })
        .await
        .expect("dividends");
    assert!(cursor.status().is_success());
    assert_eq!(cursor.remaining(), 2);
    assert_eq!(msg_types(&log), vec!["00", "13", "13"]);
}

#[tokio::test]
async fn oversized_frame_is_rejected() {
    let (config, _log) = start().await;
    let client = BaostockClient::connect(config.with_max_frame_bytes(16))
        .await
        .expect("connect");
    let err = client.login().await.expect_err("frame exceeds limit");
    assert!(matches!(err, ProviderError::Wire(WireError::Oversized(_))));
}
