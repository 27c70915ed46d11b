//! Query plane: every tool operation, built on one normalization template.
//!
//! The template issues a vendor query, checks the terminal status, drains the
//! cursor, rejects empty results with a domain "not found" message, and maps
//! each row positionally into a record.

use std::{error::Error, fmt, sync::Arc};

use chrono::NaiveDate;
use tracing::debug;

use crate::provider::{DataProvider, ProviderError, RowCursor, VendorQuery};

pub mod finance;
pub mod macro_data;
pub mod market;
pub mod reference;
pub mod rows;

pub use finance::resolve_period;
pub use rows::Row;

/// Source of "today" for date-relative queries.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Clock backed by the local system date.
#[must_use]
pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Local::now().date_naive())
}

#[derive(Debug)]
pub enum QueryError {
    Vendor(String),
    NotFound(&'static str),
    Provider(ProviderError),
    InvalidCell { field: &'static str, value: String },
    MissingColumn(&'static str),
    UnsupportedDataType(String),
    UnsupportedIndex(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vendor(message) => write!(f, "query failed: {message}"),
            Self::NotFound(message) => f.write_str(message),
            Self::Provider(err) => write!(f, "{err}"),
            Self::InvalidCell { field, value } => write!(f, "invalid value for {field}: {value:?}"),
            Self::MissingColumn(name) => write!(f, "vendor response has no {name} column"),
            Self::UnsupportedDataType(value) => write!(f, "unsupported data type: {value}"),
            Self::UnsupportedIndex(value) => write!(f, "unsupported index: {value}"),
        }
    }
}

impl Error for QueryError {}

impl From<ProviderError> for QueryError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

/// Rows drained from one vendor response, with their column names.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub fields: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Index of a named column.
    ///
    /// # Errors
    /// Returns `QueryError::MissingColumn` when the column is absent.
    pub fn column(&self, name: &'static str) -> Result<usize, QueryError> {
        self.fields
            .iter()
            .position(|field| field == name)
            .ok_or(QueryError::MissingColumn(name))
    }
}

/// Drains a cursor into rows.
///
/// # Errors
/// Returns `QueryError::Provider` if the cursor fails mid-drain.
pub fn drain<R: RowCursor>(cursor: &mut R) -> Result<Table, QueryError> {
    let mut rows = Vec::new();
    while let Some(cells) = cursor.next_row()? {
        rows.push(Row::new(cells));
    }
    Ok(Table {
        fields: cursor.fields().to_vec(),
        rows,
    })
}

/// Query operations over an authenticated vendor session.
pub struct QueryPlane<P: DataProvider> {
    provider: Arc<P>,
    clock: Clock,
}

impl<P: DataProvider> Clone for QueryPlane<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<P: DataProvider> QueryPlane<P> {
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            clock: system_clock(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub(crate) fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Issues a query and returns its cursor when the vendor reports success.
    async fn open(&self, query: VendorQuery) -> Result<P::Cursor, QueryError> {
        debug!(query = query.name(), "vendor query");
        let cursor = self.provider.query(query).await?;
        let status = cursor.status();
        if !status.is_success() {
            return Err(QueryError::Vendor(status.message.clone()));
        }
        Ok(cursor)
    }

    /// Issues a query and drains it, rejecting an empty result.
    async fn fetch(&self, query: VendorQuery, not_found: &'static str) -> Result<Table, QueryError> {
        let mut cursor = self.open(query).await?;
        let table = drain(&mut cursor)?;
        if table.rows.is_empty() {
            return Err(QueryError::NotFound(not_found));
        }
        Ok(table)
    }

    /// Issues a query and maps every row with `map`.
    async fn collect<T, F>(
        &self,
        query: VendorQuery,
        not_found: &'static str,
        map: F,
    ) -> Result<Vec<T>, QueryError>
    where
        F: Fn(&Row) -> Result<T, QueryError> + Send,
    {
        let table = self.fetch(query, not_found).await?;
        table.rows.iter().map(map).collect()
    }
}
