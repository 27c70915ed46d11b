//! In-memory provider answering queries from canned responses.
//!
//! Used to exercise the query plane and tool handlers without a network
//! connection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use baostock_model::schema::split_fields;

use super::{BufferedCursor, DataProvider, ProviderError, RawRow, ResponseStatus, VendorQuery};

/// Canned vendor behaviour for one query.
#[derive(Debug, Clone)]
pub enum Canned {
    Rows { fields: Vec<String>, rows: Vec<RawRow> },
    Status(ResponseStatus),
    Error(String),
}

impl Canned {
    /// Successful response with `fields` given as a comma separated list.
    #[must_use]
    pub fn rows(fields: &str, rows: &[&[&str]]) -> Self {
        Self::Rows {
            fields: split_fields(fields),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
                .collect(),
        }
    }

    /// Successful response without rows.
    #[must_use]
    pub fn empty(fields: &str) -> Self {
        Self::rows(fields, &[])
    }

    #[must_use]
    pub fn status(code: &str, message: &str) -> Self {
        Self::Status(ResponseStatus::failure(code, message))
    }

    #[must_use]
    pub fn error(message: &str) -> Self {
        Self::Error(message.to_string())
    }
}

/// Provider double that replays [`Canned`] responses keyed by query.
#[derive(Debug)]
pub struct MemoryProvider {
    responses: HashMap<VendorQuery, Canned>,
    fallback: Option<Canned>,
    login_status: ResponseStatus,
    logout_error: Option<String>,
    logged_in: AtomicBool,
    calls: Mutex<Vec<VendorQuery>>,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            fallback: None,
            login_status: ResponseStatus::success(),
            logout_error: None,
            logged_in: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_response(mut self, query: VendorQuery, canned: Canned) -> Self {
        self.responses.insert(query, canned);
        self
    }

    /// Response used for any query without an exact match.
    #[must_use]
    pub fn with_fallback(mut self, canned: Canned) -> Self {
        self.fallback = Some(canned);
        self
    }

    #[must_use]
    pub fn with_login_status(mut self, status: ResponseStatus) -> Self {
        self.login_status = status;
        self
    }

    #[must_use]
    pub fn with_logout_error(mut self, message: &str) -> Self {
        self.logout_error = Some(message.to_string());
        self
    }

    /// Queries received so far, in order.
    pub fn calls(&self) -> Vec<VendorQuery> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    fn respond(&self, query: &VendorQuery) -> Result<BufferedCursor, ProviderError> {
        let canned = self
            .responses
            .get(query)
            .or(self.fallback.as_ref())
            .ok_or_else(|| {
                ProviderError::Other(format!("no canned response for {}", query.name()))
            })?;
        match canned {
            Canned::Rows { fields, rows } => Ok(BufferedCursor::new(
                ResponseStatus::success(),
                fields.clone(),
                rows.clone(),
            )),
            Canned::Status(status) => Ok(BufferedCursor::failed(status.clone())),
            Canned::Error(message) => Err(ProviderError::Other(message.clone())),
        }
    }
}

impl DataProvider for MemoryProvider {
    type Cursor = BufferedCursor;

    async fn login(&self) -> Result<ResponseStatus, ProviderError> {
        if self.login_status.is_success() {
            self.logged_in.store(true, Ordering::SeqCst);
        }
        Ok(self.login_status.clone())
    }

    async fn logout(&self) -> Result<(), ProviderError> {
        self.logged_in.store(false, Ordering::SeqCst);
        match &self.logout_error {
            Some(message) => Err(ProviderError::Other(message.clone())),
            None => Ok(()),
        }
    }

    async fn query(&self, query: VendorQuery) -> Result<BufferedCursor, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());
        self.respond(&query)
    }
}
