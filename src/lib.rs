//! MCP server exposing Odoo timesheets (`account.analytic.line`) over XML-RPC.
//!
//! - `config`: Odoo connection settings and transport flags
//! - `odoo`: XML-RPC transport and the authenticated `OdooClient`
//! - `mcp`: the `OdooMcpServer` handler with its tools and resources
//! - `transport`: stdio, SSE and Streamable HTTP serving
//! - `check`: connection check used by `odoo-mcp-check`

pub mod check;
pub mod config;
pub mod mcp;
pub mod odoo;
pub mod transport;
