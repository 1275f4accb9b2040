//! Configuration error types.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while loading startup configuration.
///
/// All of these are fatal: the server refuses to start.
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {name} is required")]
    #[diagnostic(
        code(odoo_mcp::config::missing),
        help("Set {name} in the environment or in the MCP client's server definition.")
    )]
    Missing { name: String },

    #[error("Invalid Odoo base URL '{url}': {reason}")]
    #[diagnostic(
        code(odoo_mcp::config::invalid_url),
        help("Use an absolute URL such as https://mycompany.odoo.com")
    )]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported MCP transport: {value}. Use \"stdio\", \"sse\" or \"http\".")]
    #[diagnostic(code(odoo_mcp::config::unsupported_transport))]
    UnsupportedTransport { value: String },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
