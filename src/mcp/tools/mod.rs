//! MCP tool implementations
//!
//! Tool handlers live in per-entity modules; this module holds the input
//! validation and error mapping they share.

pub mod timesheets;

#[cfg(test)]
mod timesheets_test;

use chrono::NaiveDate;
use miette::Diagnostic;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::odoo::OdooError;

pub use timesheets::{
    CreateTimesheetOutput, CreateTimesheetParams, ListTimesheetsOutput, ListTimesheetsParams,
    UpdateTimesheetOutput, UpdateTimesheetParams,
};

pub const DESCRIPTION_MAX_CHARS: usize = 120;
pub const LIMIT_MIN: u32 = 1;
pub const LIMIT_MAX: u32 = 200;
pub const DEFAULT_LIMIT: u32 = 20;
pub const HOURS_MAX: f64 = 24.0;

/// Tool input rejected before reaching Odoo.
#[derive(Error, Diagnostic, Debug, PartialEq)]
#[error("Invalid {field}: {message}")]
#[diagnostic(code(odoo_mcp::mcp::validation))]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

/// Record ids: `min` is 0 for filters, 1 for records being written.
pub(crate) fn check_id(field: &'static str, value: Option<i32>, min: i32) -> ValidationResult {
    match value {
        Some(id) if id < min => Err(ValidationError::new(
            field,
            format!("must be an integer >= {min}"),
        )),
        _ => Ok(()),
    }
}

/// `YYYY-MM-DD`, and a real calendar date.
pub(crate) fn check_date(field: &'static str, value: Option<&str>) -> ValidationResult {
    let Some(date) = value else {
        return Ok(());
    };
    let shaped = date.len() == 10
        && date.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    if !shaped || NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Err(ValidationError::new(
            field,
            "Date must be formatted as YYYY-MM-DD",
        ));
    }
    Ok(())
}

pub(crate) fn check_text(field: &'static str, value: Option<&str>) -> ValidationResult {
    let Some(text) = value else {
        return Ok(());
    };
    let chars = text.chars().count();
    if text.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if chars > DESCRIPTION_MAX_CHARS {
        return Err(ValidationError::new(
            field,
            format!("must be at most {DESCRIPTION_MAX_CHARS} characters (got {chars})"),
        ));
    }
    Ok(())
}

pub(crate) fn check_hours(field: &'static str, value: Option<f64>) -> ValidationResult {
    match value {
        Some(hours) if !hours.is_finite() || !(0.0..=HOURS_MAX).contains(&hours) => Err(
            ValidationError::new(field, format!("must be between 0 and {HOURS_MAX}")),
        ),
        _ => Ok(()),
    }
}

pub(crate) fn check_limit(limit: u32) -> ValidationResult {
    if !(LIMIT_MIN..=LIMIT_MAX).contains(&limit) {
        return Err(ValidationError::new(
            "limit",
            format!("must be between {LIMIT_MIN} and {LIMIT_MAX}"),
        ));
    }
    Ok(())
}

pub(crate) fn invalid_params(err: ValidationError) -> McpError {
    McpError::invalid_params(err.to_string(), Some(json!({ "field": err.field })))
}

/// Successful tool result: `output` as structured content plus JSON text.
pub(crate) fn structured<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let value = serde_json::to_value(output).map_err(|e| {
        McpError::internal_error(format!("Failed to serialize tool output: {e}"), None)
    })?;
    Ok(CallToolResult::structured(value))
}

/// Failed tool result (`isError: true`) carrying `message` as text.
pub(crate) fn tool_failure(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Report a client failure prefixed with the tool name.
///
/// Bad arguments are protocol errors (`invalid_params`). Failures on the
/// Odoo side are returned as the tool's result so the calling agent sees
/// the message.
pub(crate) fn odoo_failure(tool: &str, err: OdooError) -> Result<CallToolResult, McpError> {
    let message = format!("[{tool}] {err}");
    match err {
        OdooError::NoFieldsToUpdate | OdooError::InvalidId { .. } => {
            Err(McpError::invalid_params(message, None))
        }
        OdooError::Auth | OdooError::Remote { .. } | OdooError::UnexpectedResponse { .. } => {
            warn!(tool, error = %err, "Odoo call failed");
            Ok(tool_failure(message))
        }
    }
}
