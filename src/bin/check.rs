//! Odoo connection check.
//!
//! Authenticates with the configured Odoo instance and prints the most
//! recent timesheet lines.

use clap::Parser;
use odoo_mcp::check;
use odoo_mcp::config::OdooConfig;
use odoo_mcp::odoo::{HttpTransport, OdooClient};
use odoo_mcp::transport;

#[derive(Parser)]
#[command(name = "odoo-mcp-check")]
#[command(version, about = "Check the Odoo connection used by odoo-mcp", long_about = None)]
struct Cli {}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let _ = rustls::crypto::ring::default_provider().install_default();
    transport::init_tracing();
    Cli::parse();

    let config = OdooConfig::from_env()?;
    let client = OdooClient::new(config.clone(), HttpTransport::new(&config)?);

    let output = check::run(&client).await?;
    println!("{output}");
    Ok(())
}
