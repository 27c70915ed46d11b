//! Translation between vendor codes (`sh.600000`) and internal tickers
//! (`SSE:600000`).
//!
//! Only the Shanghai and Shenzhen exchanges are recognised. Anything else is
//! passed through untouched in both directions.

/// Vendor prefix for the Shanghai Stock Exchange.
pub const VENDOR_PREFIX_SH: &str = "sh.";
/// Vendor prefix for the Shenzhen Stock Exchange.
pub const VENDOR_PREFIX_SZ: &str = "sz.";
/// Internal exchange name for Shanghai.
pub const EXCHANGE_SSE: &str = "SSE";
/// Internal exchange name for Shenzhen.
pub const EXCHANGE_SZSE: &str = "SZSE";

/// Converts a vendor code into the internal `EXCHANGE:symbol` form.
#[must_use]
pub fn to_internal(code: &str) -> String {
    if let Some(symbol) = code.strip_prefix(VENDOR_PREFIX_SH) {
        format!("{EXCHANGE_SSE}:{symbol}")
    } else if let Some(symbol) = code.strip_prefix(VENDOR_PREFIX_SZ) {
        format!("{EXCHANGE_SZSE}:{symbol}")
    } else {
        code.to_string()
    }
}

/// Converts an internal ticker into the vendor code form.
#[must_use]
pub fn to_vendor(ticker: &str) -> String {
    let Some((exchange, symbol)) = ticker.split_once(':') else {
        return ticker.to_string();
    };
    match exchange {
        EXCHANGE_SSE => format!("{VENDOR_PREFIX_SH}{symbol}"),
        EXCHANGE_SZSE => format!("{VENDOR_PREFIX_SZ}{symbol}"),
        _ => ticker.to_string(),
    }
}
