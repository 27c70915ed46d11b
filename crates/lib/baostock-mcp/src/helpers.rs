use std::fmt::Display;

use baostock_model::{ListEnvelope, ObjectEnvelope};
use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use tracing::debug;

/// Wraps a list query outcome in the list envelope.
///
/// Query failures are reported in-band; only serialization failures surface as
/// protocol errors.
pub fn list_result<T, E>(tool: &str, result: Result<Vec<T>, E>) -> Result<CallToolResult, ErrorData>
where
    T: Serialize,
    E: Display,
{
    let envelope = ListEnvelope::from(result);
    if let Some(message) = envelope.error() {
        debug!(tool, error = message, "tool answered with error record");
    }
    Ok(CallToolResult::success(vec![Content::json(envelope)?]))
}

/// Wraps a single-object query outcome in the object envelope.
pub fn object_result<T, E>(tool: &str, result: Result<T, E>) -> Result<CallToolResult, ErrorData>
where
    T: Serialize,
    E: Display,
{
    let envelope = ObjectEnvelope::from(result);
    if let Some(message) = envelope.error() {
        debug!(tool, error = message, "tool answered with error record");
    }
    Ok(CallToolResult::success(vec![Content::json(envelope)?]))
}
