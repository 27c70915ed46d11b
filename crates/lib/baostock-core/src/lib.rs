//! Core services for baostock-mcp.
//!
//! This crate talks to the Baostock vendor over its TCP protocol, owns the
//! login/logout lifecycle of the shared vendor session, and exposes the query
//! plane that turns vendor tables into typed records.

pub mod control;
pub mod provider;
pub mod services;
