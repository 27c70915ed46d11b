//! Vendor collaborator interface.
//!
//! A `DataProvider` authenticates once, then answers `VendorQuery` requests
//! with a `RowCursor`. The Baostock TCP client and the in-memory test double
//! both implement it.

pub mod client;
pub mod memory;
pub mod query;
pub mod wire;

use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::future::Future;

pub use client::{BaostockClient, ClientConfig};
pub use memory::{Canned, MemoryProvider};
pub use query::{FinancialKind, IndexKind, MacroKind, VendorQuery};
pub use wire::WireError;

/// Status code the vendor uses for a successful response.
pub const SUCCESS_CODE: &str = "0";

/// Raw row as returned by the vendor: ordered string cells.
pub type RawRow = Vec<String>;

/// Terminal status reported by the vendor for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseStatus {
    pub code: String,
    pub message: String,
}

impl ResponseStatus {
    #[must_use]
    pub fn success() -> Self {
        Self {
            code: SUCCESS_CODE.to_string(),
            message: "success".to_string(),
        }
    }

    #[must_use]
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

#[derive(Debug)]
pub enum ProviderError {
    Io(std::io::Error),
    Wire(WireError),
    Payload(serde_json::Error),
    Timeout,
    NotLoggedIn,
    Unsupported(String),
    Other(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "vendor connection error: {err}"),
            Self::Wire(err) => write!(f, "{err}"),
            Self::Payload(err) => write!(f, "invalid vendor payload: {err}"),
            Self::Timeout => write!(f, "vendor request timed out"),
            Self::NotLoggedIn => write!(f, "vendor session is not logged in"),
            Self::Unsupported(query) => write!(f, "query not supported by vendor: {query}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ProviderError {}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<WireError> for ProviderError {
    fn from(err: WireError) -> Self {
        Self::Wire(err)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err)
    }
}

/// Row-by-row access to a vendor response.
pub trait RowCursor: Send {
    /// Status the vendor reported for the request.
    fn status(&self) -> &ResponseStatus;

    /// Column names, in cell order.
    fn fields(&self) -> &[String];

    /// Advances the cursor. `Ok(None)` once the rows are exhausted.
    ///
    /// # Errors
    /// Returns `ProviderError` if the next row cannot be produced.
    fn next_row(&mut self) -> Result<Option<RawRow>, ProviderError>;
}

/// Cursor over rows already held in memory.
#[derive(Debug, Clone)]
pub struct BufferedCursor {
    status: ResponseStatus,
    fields: Vec<String>,
    rows: VecDeque<RawRow>,
}

impl BufferedCursor {
    #[must_use]
    pub fn new(status: ResponseStatus, fields: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self {
            status,
            fields,
            rows: rows.into(),
        }
    }

    /// Cursor for a failed request with no rows.
    #[must_use]
    pub fn failed(status: ResponseStatus) -> Self {
        Self::new(status, Vec::new(), Vec::new())
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl RowCursor for BufferedCursor {
    fn status(&self) -> &ResponseStatus {
        &self.status
    }

    fn fields(&self) -> &[String] {
        &self.fields
    }

    fn next_row(&mut self) -> Result<Option<RawRow>, ProviderError> {
        Ok(self.rows.pop_front())
    }
}

/// Authenticated access to the data vendor.
pub trait DataProvider: Send + Sync + 'static {
    type Cursor: RowCursor;

    /// Authenticates with the vendor.
    ///
    /// # Errors
    /// Returns `ProviderError` on transport failure. A rejected login is a
    /// non-success `ResponseStatus`, not an error.
    fn login(&self) -> impl Future<Output = Result<ResponseStatus, ProviderError>> + Send;

    /// Ends the vendor session.
    ///
    /// # Errors
    /// Returns `ProviderError` on transport failure.
    fn logout(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Issues a single query.
    ///
    /// # Errors
    /// Returns `ProviderError` on transport failure or unsupported queries.
    fn query(
        &self,
        query: VendorQuery,
    ) -> impl Future<Output = Result<Self::Cursor, ProviderError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_cursor_yields_rows_in_order() {
        let mut cursor = BufferedCursor::new(
            ResponseStatus::success(),
            vec!["a".to_string()],
            vec![vec!["1".to_string()], vec!["2".to_string()]],
        );
        assert!(cursor.status().is_success());
        assert_eq!(cursor.next_row().expect("row"), Some(vec!["1".to_string()]));
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.next_row().expect("row"), Some(vec!["2".to_string()]));
        assert_eq!(cursor.next_row().expect("row"), None);
    }

    #[test]
    fn failure_status_is_not_success() {
        let status = ResponseStatus::failure("10004011", "invalid code");
        assert!(!status.is_success());
    }
}
