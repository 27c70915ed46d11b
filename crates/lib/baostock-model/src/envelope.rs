//! Uniform success-or-error result shapes returned by every tool.
//!
//! Failures are reported in-band: a list tool answers `[{"error": "..."}]`
//! and an object tool answers `{"error": "..."}`.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Single error record carrying a human readable message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorRecord {
    pub error: String,
}

impl ErrorRecord {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Result of a list-returning tool.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Records(Vec<T>),
    Failed(Vec<ErrorRecord>),
}

impl<T> ListEnvelope<T> {
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(vec![ErrorRecord::new(message)])
    }

    /// Returns the error message when this envelope carries a failure.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Records(_) => None,
            Self::Failed(errors) => errors.first().map(|record| record.error.as_str()),
        }
    }

    #[must_use]
    pub fn records(&self) -> Option<&[T]> {
        match self {
            Self::Records(records) => Some(records),
            Self::Failed(_) => None,
        }
    }
}

impl<T, E: Display> From<Result<Vec<T>, E>> for ListEnvelope<T> {
    fn from(result: Result<Vec<T>, E>) -> Self {
        match result {
            Ok(records) => Self::Records(records),
            Err(err) => Self::failed(err.to_string()),
        }
    }
}

/// Result of a tool that answers with a single object.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ObjectEnvelope<T> {
    Record(T),
    Failed(ErrorRecord),
}

impl<T> ObjectEnvelope<T> {
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Record(_) => None,
            Self::Failed(record) => Some(record.error.as_str()),
        }
    }

    #[must_use]
    pub const fn record(&self) -> Option<&T> {
        match self {
            Self::Record(record) => Some(record),
            Self::Failed(_) => None,
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for ObjectEnvelope<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(record) => Self::Record(record),
            Err(err) => Self::Failed(ErrorRecord::new(err.to_string())),
        }
    }
}
