use baostock_model::StatementRow;
use serde_json::Value;

use super::QueryError;

/// One drained vendor row with typed cell accessors.
///
/// Cells beyond the end of the row read as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    #[must_use]
    pub const fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map_or("", String::as_str)
    }

    #[must_use]
    pub fn text(&self, index: usize) -> String {
        self.cell(index).to_string()
    }

    /// Parses a floating point cell. Empty cells are absent.
    ///
    /// # Errors
    /// Returns `QueryError::InvalidCell` when the cell is not a number.
    pub fn float(&self, index: usize, field: &'static str) -> Result<Option<f64>, QueryError> {
        let cell = self.cell(index);
        if cell.is_empty() {
            return Ok(None);
        }
        cell.trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid(field, cell))
    }

    /// Parses a count cell as a float and truncates it toward zero.
    ///
    /// # Errors
    /// Returns `QueryError::InvalidCell` when the cell is not a finite number.
    #[allow(clippy::cast_possible_truncation)]
    pub fn count(&self, index: usize, field: &'static str) -> Result<Option<i64>, QueryError> {
        match self.float(index, field)? {
            Some(value) if value.is_finite() => Ok(Some(value.trunc() as i64)),
            Some(_) => Err(invalid(field, self.cell(index))),
            None => Ok(None),
        }
    }

    /// Reads an integer flag cell; true when it equals 1.
    ///
    /// # Errors
    /// Returns `QueryError::InvalidCell` when the cell is not an integer.
    pub fn flag(&self, index: usize, field: &'static str) -> Result<bool, QueryError> {
        let cell = self.cell(index);
        cell.trim()
            .parse::<i64>()
            .map(|value| value == 1)
            .map_err(|_| invalid(field, cell))
    }

    /// Keys the cells by the given column names.
    #[must_use]
    pub fn to_object(&self, fields: &[String]) -> StatementRow {
        fields
            .iter()
            .zip(&self.cells)
            .map(|(name, cell)| (name.clone(), Value::String(cell.clone())))
            .collect()
    }
}

fn invalid(field: &'static str, cell: &str) -> QueryError {
    QueryError::InvalidCell {
        field,
        value: cell.to_string(),
    }
}
