//! Odoo XML-RPC access for timesheet lines.
//!
//! - `transport`: the `RpcTransport` seam and its reqwest implementation
//! - `client`: `OdooClient`, authentication and the four model calls
//! - `models`: records, references, domains and write payloads
//! - `error`: `RpcError` and `OdooError`

mod client;
mod error;
mod models;
mod transport;


pub use client::OdooClient;
pub use error::{OdooError, OdooResult, RpcError};
pub use models::{
    DomainClause, NewTimesheet, Reference, TIMESHEET_FIELDS, TIMESHEET_MODEL, TIMESHEET_ORDER,
    Timesheet, TimesheetFilters, TimesheetPatch, TimesheetRecord,
};
pub use transport::{COMMON_PATH, Endpoint, HttpTransport, OBJECT_PATH, RpcTransport};

#[cfg(test)]
pub(crate) use transport::MockRpcTransport;
