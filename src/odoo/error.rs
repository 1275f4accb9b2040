//! Odoo client error types.
//!
//! `RpcError` covers a single XML-RPC exchange; `OdooError` is what callers
//! of [`OdooClient`](super::OdooClient) see, annotated with the operation
//! that triggered the failure.

use miette::Diagnostic;
use thiserror::Error;

/// Failure of one XML-RPC exchange.
#[derive(Error, Diagnostic, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    #[diagnostic(
        code(odoo_mcp::rpc::http),
        help("Check ODOO_BASE_URL and that the Odoo instance is reachable.")
    )]
    Http(#[from] reqwest::Error),

    #[error("Odoo returned HTTP {status}: {body}")]
    #[diagnostic(code(odoo_mcp::rpc::status))]
    Status { status: u16, body: String },

    #[error("XML-RPC call {method} failed: {message}")]
    #[diagnostic(code(odoo_mcp::rpc::fault))]
    Fault { method: String, message: String },

    #[error("Failed to encode XML-RPC request {method}: {message}")]
    #[diagnostic(code(odoo_mcp::rpc::encode))]
    Encode { method: String, message: String },
}

/// Errors surfaced by [`OdooClient`](super::OdooClient).
#[derive(Error, Diagnostic, Debug)]
pub enum OdooError {
    #[error("Failed to authenticate with Odoo; check credentials and permissions.")]
    #[diagnostic(
        code(odoo_mcp::odoo::auth),
        help("Verify ODOO_DATABASE, ODOO_USERNAME and ODOO_PASSWORD (or ODOO_API_KEY).")
    )]
    Auth,

    #[error("[{operation}] {source}")]
    #[diagnostic(code(odoo_mcp::odoo::remote))]
    Remote {
        operation: &'static str,
        #[source]
        source: RpcError,
    },

    #[error("No fields provided to update the timesheet.")]
    #[diagnostic(code(odoo_mcp::odoo::no_fields))]
    NoFieldsToUpdate,

    #[error("Record id {id} is out of range for XML-RPC")]
    #[diagnostic(code(odoo_mcp::odoo::invalid_id))]
    InvalidId { id: i64 },

    #[error("[{operation}] unexpected response from Odoo: {detail}")]
    #[diagnostic(code(odoo_mcp::odoo::unexpected_response))]
    UnexpectedResponse {
        operation: &'static str,
        detail: String,
    },
}

impl OdooError {
    pub(crate) fn remote(operation: &'static str) -> impl FnOnce(RpcError) -> Self {
        move |source| Self::Remote { operation, source }
    }

    pub(crate) fn unexpected(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            operation,
            detail: detail.into(),
        }
    }
}

/// Result type for Odoo operations.
pub type OdooResult<T> = Result<T, OdooError>;
