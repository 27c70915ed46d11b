//! Record models and identifier helpers for baostock-mcp.
//!
//! This crate defines the record shapes returned by every query tool, the
//! result envelope that wraps them, the vendor field schema, and the
//! translation between vendor and internal security identifiers.

pub mod envelope;
pub mod models;
pub mod schema;
pub mod ticker;

pub use envelope::{ErrorRecord, ListEnvelope, ObjectEnvelope};
pub use models::*;
