//! Startup configuration.
//!
//! - `odoo`: connection settings read from `ODOO_*` variables
//! - `server`: transport settings for the binary (flags with `MCP_*` fallbacks)

mod error;
mod odoo;
mod server;


pub use error::{ConfigError, ConfigResult};
pub use odoo::{ENV_API_KEY, ENV_BASE_URL, ENV_DATABASE, ENV_PASSWORD, ENV_USERNAME, OdooConfig};
pub use server::{ServerConfig, Transport};
