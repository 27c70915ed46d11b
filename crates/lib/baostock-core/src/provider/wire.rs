//! Baostock message framing.
//!
//! Requests are `header | body | crc32` lines. The header is
//! `<version>\x01<msg type>\x01<body length, 10 digits>` (21 bytes). Responses
//! end with [`TERMINATOR`]; bodies of compressed message types are zlib
//! streams whose length is carried in the header.

use std::error::Error;
use std::fmt;
use std::io::Read;

use flate2::read::ZlibDecoder;
use serde::Deserialize;
use serde_json::Value;

use super::{RawRow, ResponseStatus};

pub const CLIENT_VERSION: &str = "00.8.90";
pub const MESSAGE_SPLIT: char = '\u{1}';
pub const HEADER_LENGTH: usize = 21;
pub const BODY_LENGTH_DIGITS: usize = 10;
pub const TERMINATOR: &[u8] = b"<![CDATA[]]>\n";
pub const PER_PAGE_COUNT: usize = 10_000;

pub const MSG_LOGIN_REQUEST: &str = "00";
pub const MSG_LOGOUT_REQUEST: &str = "02";
pub const MSG_DIVIDEND_REQUEST: &str = "13";
pub const MSG_ADJUST_FACTOR_REQUEST: &str = "15";
pub const MSG_PROFIT_REQUEST: &str = "17";
pub const MSG_OPERATION_REQUEST: &str = "19";
pub const MSG_GROWTH_REQUEST: &str = "21";
pub const MSG_BALANCE_REQUEST: &str = "25";
pub const MSG_CASH_FLOW_REQUEST: &str = "27";
pub const MSG_PERFORMANCE_EXPRESS_REQUEST: &str = "29";
pub const MSG_FORECAST_REQUEST: &str = "31";
pub const MSG_TRADE_DATES_REQUEST: &str = "33";
pub const MSG_ALL_STOCK_REQUEST: &str = "35";
pub const MSG_STOCK_BASIC_REQUEST: &str = "45";
pub const MSG_STOCK_INDUSTRY_REQUEST: &str = "59";
pub const MSG_HS300_REQUEST: &str = "61";
pub const MSG_SZ50_REQUEST: &str = "63";
pub const MSG_ZZ500_REQUEST: &str = "65";
pub const MSG_KDATA_PLUS_REQUEST: &str = "95";
pub const MSG_KDATA_PLUS_RESPONSE: &str = "96";

const COMPRESSED_MESSAGE_TYPES: &[&str] = &[MSG_KDATA_PLUS_RESPONSE];

/// Positions of the common leading fields in a response body.
pub const BODY_ERROR_CODE: usize = 0;
pub const BODY_ERROR_MSG: usize = 1;
pub const BODY_USER_ID: usize = 3;
pub const BODY_PER_PAGE: usize = 5;
pub const BODY_DATA: usize = 6;

#[derive(Debug)]
pub enum WireError {
    Truncated { expected: usize, actual: usize },
    MalformedHeader(String),
    InvalidUtf8,
    Decompress(std::io::Error),
    Oversized(usize),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { expected, actual } => {
                write!(f, "truncated vendor frame: expected {expected} bytes, got {actual}")
            }
            Self::MalformedHeader(header) => write!(f, "malformed vendor header: {header:?}"),
            Self::InvalidUtf8 => write!(f, "vendor frame is not valid UTF-8"),
            Self::Decompress(err) => write!(f, "failed to inflate vendor body: {err}"),
            Self::Oversized(len) => write!(f, "vendor frame exceeds limit ({len} bytes)"),
        }
    }
}

impl Error for WireError {}

/// Encodes a request line ready to be written to the socket.
#[must_use]
pub fn encode_request(msg_type: &str, body: &[&str]) -> Vec<u8> {
    let split = MESSAGE_SPLIT.to_string();
    let body = body.join(&split);
    let body_len = body.chars().count();
    let head_body = format!(
        "{CLIENT_VERSION}{MESSAGE_SPLIT}{msg_type}{MESSAGE_SPLIT}{body_len:0width$}{body}",
        width = BODY_LENGTH_DIGITS
    );
    let crc = crc32fast::hash(head_body.as_bytes());
    format!("{head_body}{MESSAGE_SPLIT}{crc}\n").into_bytes()
}

/// Returns true once `buffer` holds a complete response.
#[must_use]
pub fn is_complete(buffer: &[u8]) -> bool {
    buffer.ends_with(TERMINATOR)
}

/// Decoded response: message type plus `\x01` separated body fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    pub msg_type: String,
    pub fields: Vec<String>,
}

impl ResponseFrame {
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Vendor status carried in the first two body fields.
    #[must_use]
    pub fn status(&self) -> ResponseStatus {
        ResponseStatus::failure(
            self.field(BODY_ERROR_CODE).unwrap_or_default(),
            self.field(BODY_ERROR_MSG).unwrap_or_default(),
        )
    }
}

/// Decodes a complete response buffer.
///
/// # Errors
/// Returns `WireError` when the header is malformed, the body is truncated,
/// or a compressed body cannot be inflated.
pub fn decode_response(raw: &[u8]) -> Result<ResponseFrame, WireError> {
    if raw.len() < HEADER_LENGTH {
        return Err(WireError::Truncated {
            expected: HEADER_LENGTH,
            actual: raw.len(),
        });
    }
    let header = std::str::from_utf8(&raw[..HEADER_LENGTH]).map_err(|_| WireError::InvalidUtf8)?;
    let parts: Vec<&str> = header.split(MESSAGE_SPLIT).collect();
    let [_, msg_type, body_len] = parts.as_slice() else {
        return Err(WireError::MalformedHeader(header.to_string()));
    };
    let body_len: usize = body_len
        .trim()
        .parse()
        .map_err(|_| WireError::MalformedHeader(header.to_string()))?;

    let body = if COMPRESSED_MESSAGE_TYPES.contains(msg_type) {
        let end = HEADER_LENGTH + body_len;
        let compressed = raw.get(HEADER_LENGTH..end).ok_or(WireError::Truncated {
            expected: end,
            actual: raw.len(),
        })?;
        let mut inflated = String::new();
        ZlibDecoder::new(compressed)
            .read_to_string(&mut inflated)
            .map_err(WireError::Decompress)?;
        inflated
    } else {
        std::str::from_utf8(&raw[HEADER_LENGTH..])
            .map_err(|_| WireError::InvalidUtf8)?
            .to_string()
    };

    Ok(ResponseFrame {
        msg_type: (*msg_type).to_string(),
        fields: split_body(&body),
    })
}

fn split_body(body: &str) -> Vec<String> {
    let terminator = std::str::from_utf8(TERMINATOR).unwrap_or_default();
    let body = body.strip_suffix(terminator).unwrap_or(body);
    let body = body.trim_end_matches('\n');
    let body = body
        .strip_suffix(terminator.trim_end_matches('\n'))
        .unwrap_or(body);
    body.split(MESSAGE_SPLIT).map(str::to_string).collect()
}

#[derive(Debug, Deserialize)]
struct RecordPage {
    #[serde(default)]
    record: Vec<Vec<Value>>,
}

/// Parses the `{"record": [[...], ...]}` data field into raw rows.
///
/// # Errors
/// Returns the JSON error when the payload is not a record page.
pub fn parse_records(data: &str) -> Result<Vec<RawRow>, serde_json::Error> {
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    let page: RecordPage = serde_json::from_str(data)?;
    Ok(page
        .record
        .into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    use super::*;

    fn header(msg_type: &str, body_len: usize) -> String {
        format!("{CLIENT_VERSION}\u{1}{msg_type}\u{1}{body_len:010}")
    }

    #[test]
    fn encoded_request_carries_header_and_crc() {
        let encoded = encode_request(MSG_LOGIN_REQUEST, &["login", "anonymous", "123456", "0"]);
        let text = String::from_utf8(encoded).expect("request should be utf-8");
        let body = "login\u{1}anonymous\u{1}123456\u{1}0";
        let head_body = format!("{}{body}", header(MSG_LOGIN_REQUEST, body.len()));
        assert_eq!(header(MSG_LOGIN_REQUEST, 0).len(), HEADER_LENGTH);
        let crc = crc32fast::hash(head_body.as_bytes());
        assert_eq!(text, format!("{head_body}\u{1}{crc}\n"));
    }

    #[test]
    fn decodes_plain_response() {
        let body = "0\u{1}success\u{1}login\u{1}anonymous";
        let mut raw = header("01", body.len()).into_bytes();
        raw.extend_from_slice(body.as_bytes());
        raw.extend_from_slice(TERMINATOR);
        assert!(is_complete(&raw));

        let frame = decode_response(&raw).expect("frame should decode");
        assert_eq!(frame.msg_type, "01");
        assert!(frame.status().is_success());
        assert_eq!(frame.field(BODY_USER_ID), Some("anonymous"));
    }

    #[test]
    fn decodes_compressed_response() {
        let body = "0\u{1}success\u{1}query_history_k_data_plus\u{1}anonymous\u{1}1\u{1}10000\u{1}{\"record\":[[\"2024-01-02\",\"sh.600000\"]]}";
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body.as_bytes()).expect("compress body");
        let compressed = encoder.finish().expect("finish compression");

        let mut raw = header(MSG_KDATA_PLUS_RESPONSE, compressed.len()).into_bytes();
        raw.extend_from_slice(&compressed);
        raw.extend_from_slice(TERMINATOR);

        let frame = decode_response(&raw).expect("frame should decode");
        assert_eq!(frame.field(BODY_PER_PAGE), Some("10000"));
        let rows = parse_records(frame.field(BODY_DATA).expect("data field"))
            .expect("records should parse");
        assert_eq!(rows, vec![vec!["2024-01-02".to_string(), "sh.600000".to_string()]]);
    }

    #[test]
    fn rejects_short_frames() {
        let err = decode_response(b"00.8.90").expect_err("short frame should fail");
        assert!(matches!(err, WireError::Truncated { .. }));
    }

    #[test]
    fn rejects_truncated_compressed_body() {
        let mut raw = header(MSG_KDATA_PLUS_RESPONSE, 500).into_bytes();
        raw.extend_from_slice(b"xx");
        let err = decode_response(&raw).expect_err("truncated body should fail");
        assert!(matches!(err, WireError::Truncated { expected: 521, .. }));
    }

    #[test]
    fn parses_records_with_mixed_cells() {
        let rows = parse_records(r#"{"record":[["a",null,1.5]]}"#).expect("records");
        assert_eq!(rows, vec![vec!["a".to_string(), String::new(), "1.5".to_string()]]);
        assert!(parse_records("").expect("empty data").is_empty());
    }
}
