//! Model Context Protocol (MCP) server implementation
//!
//! # Architecture
//!
//! - **server**: `OdooMcpServer`, the `ServerHandler` shared by all transports
//! - **tools**: timesheet tools plus shared input validation
//! - **resources**: README, environment summary and field reference
//! - **service**: Streamable HTTP service for Axum
//!
//! The server is generic over `T: RpcTransport`, so tools are exercised in
//! tests against a mocked XML-RPC transport.

pub mod resources;
pub mod server;
mod service;
pub mod tools;

#[cfg(test)]
mod resources_test;
#[cfg(test)]
pub(crate) mod testing;

pub use resources::{EnvironmentSnapshot, ResourceCatalog, ResourceError};
pub use server::{OdooMcpServer, SERVER_NAME};
pub use service::create_mcp_service;
