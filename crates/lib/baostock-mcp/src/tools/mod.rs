//! MCP tool modules.
//!
//! Tools are grouped by domain: stock, finance, market calendar, index and
//! macro data, plus contextual help for identifier formats.

pub mod context;
pub mod finance;
pub mod index;
pub mod macro_data;
pub mod market;
pub mod stock;
