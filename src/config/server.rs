//! Transport settings for the `odoo-mcp` binary.

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use super::error::ConfigError;

/// How the MCP server is delivered to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// One session over stdin/stdout
    Stdio,
    /// Legacy SSE stream plus POST endpoint, one session per connection
    Sse,
    /// Streamable HTTP mounted at `/mcp`
    Http,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "sse" => Ok(Self::Sse),
            "http" => Ok(Self::Http),
            _ => Err(ConfigError::UnsupportedTransport {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::Http => "http",
        };
        f.write_str(name)
    }
}

fn default_readme() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("README.md")
}

/// Server settings. Every flag falls back to an environment variable.
#[derive(Parser, Debug, Clone)]
#[command(name = "odoo-mcp")]
#[command(version, about = "MCP server for Odoo timesheets", long_about = None)]
pub struct ServerConfig {
    /// Transport: stdio, sse or http
    #[arg(long, env = "MCP_TRANSPORT", default_value = "stdio", value_parser = Transport::from_str)]
    pub transport: Transport,

    /// Host address to bind to (sse/http)
    #[arg(long, env = "MCP_HTTP_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on (sse/http)
    #[arg(short, long, env = "MCP_HTTP_PORT", default_value_t = 3333)]
    pub port: u16,

    /// Path serving the SSE event stream
    #[arg(long, env = "MCP_SSE_PATH", default_value = "/sse")]
    pub sse_path: String,

    /// Path receiving client messages for SSE sessions
    #[arg(long, env = "MCP_SSE_POST_PATH", default_value = "/messages")]
    pub post_path: String,

    /// README served as the documentation resource
    #[arg(long, env = "MCP_README_PATH", default_value_os_t = default_readme())]
    pub readme: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3333,
            sse_path: "/sse".to_string(),
            post_path: "/messages".to_string(),
            readme: default_readme(),
        }
    }
}

impl ServerConfig {
    /// Socket address string for the HTTP transports.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
