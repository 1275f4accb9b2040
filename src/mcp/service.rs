//! MCP Streamable HTTP service creation
//!
//! This module provides functions to create the MCP service
//! that can be integrated with an Axum router.

use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

use super::server::OdooMcpServer;
use crate::odoo::RpcTransport;

/// Create MCP Streamable HTTP service
///
/// Every session gets its own `OdooMcpServer` clone; all clones share the
/// same authenticated Odoo client.
///
/// # Example
/// ```no_run
/// # use std::sync::Arc;
/// use axum::Router;
/// use tokio_util::sync::CancellationToken;
/// # use odoo_mcp::config::OdooConfig;
/// # use odoo_mcp::mcp::{EnvironmentSnapshot, OdooMcpServer, ResourceCatalog, create_mcp_service};
/// # use odoo_mcp::odoo::{HttpTransport, OdooClient};
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let config = OdooConfig::from_env()?;
/// # let client = Arc::new(OdooClient::new(config.clone(), HttpTransport::new(&config)?));
/// # let resources = Arc::new(ResourceCatalog::new("README.md", EnvironmentSnapshot::capture()));
/// let server = OdooMcpServer::new(client, resources);
/// let ct = CancellationToken::new();
/// let app: Router = Router::new().nest_service("/mcp", create_mcp_service(server, ct));
/// # Ok(())
/// # }
/// ```
pub fn create_mcp_service<T: RpcTransport + 'static>(
    server: OdooMcpServer<T>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<OdooMcpServer<T>, LocalSessionManager> {
    // Service factory: creates new server instance per session
    // Note: Returns io::Error to match rmcp's expected signature
    let service_factory = move || -> Result<OdooMcpServer<T>, std::io::Error> { Ok(server.clone()) };

    let config = StreamableHttpServerConfig::default()
        .with_sse_keep_alive(None) // Use default (15s)
        .with_sse_retry(None) // Use default retry behavior
        .with_stateful_mode(true) // Enable session management
        .with_cancellation_token(cancellation_token);

    StreamableHttpService::new(
        service_factory,
        LocalSessionManager::default().into(),
        config,
    )
}
