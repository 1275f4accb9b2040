//! Odoo MCP server binary.
//!
//! Builds the concrete XML-RPC transport and hands the server to the
//! configured MCP transport. The MCP layer stays generic over the transport.

use std::sync::Arc;

use clap::Parser;
use miette::Diagnostic;
use odoo_mcp::config::{ConfigError, OdooConfig, ServerConfig};
use odoo_mcp::mcp::{EnvironmentSnapshot, OdooMcpServer, ResourceCatalog};
use odoo_mcp::odoo::{HttpTransport, OdooClient};
use odoo_mcp::transport::{self, ServeError};
use thiserror::Error;
use tracing::info;

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Serve(#[from] ServeError),
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let _ = rustls::crypto::ring::default_provider().install_default();
    transport::init_tracing();

    let config = ServerConfig::parse();
    run(config).await?;
    Ok(())
}

async fn run(config: ServerConfig) -> Result<(), BinaryError> {
    let odoo = OdooConfig::from_env()?;
    info!(base_url = %odoo.base_url, database = %odoo.database, transport = %config.transport, "Starting Odoo MCP server");

    let client = Arc::new(OdooClient::new(odoo.clone(), HttpTransport::new(&odoo)?));
    let resources = Arc::new(ResourceCatalog::new(
        config.readme.clone(),
        EnvironmentSnapshot::capture(),
    ));

    transport::run(&config, OdooMcpServer::new(client, resources)).await?;
    Ok(())
}
