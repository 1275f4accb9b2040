//! Serving an `OdooMcpServer` over stdio, legacy SSE or Streamable HTTP.
//!
//! - **session**: `SessionTable` for SSE connections
//! - **sse**: axum routes for the SSE event stream and POST endpoint
//!
//! All transports stop on SIGINT/SIGTERM through one `CancellationToken`.

mod session;
mod sse;


use axum::Router;
use miette::Diagnostic;
use rmcp::ServiceExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ServerConfig, Transport};
use crate::mcp::{OdooMcpServer, create_mcp_service};
use crate::odoo::RpcTransport;

pub use session::{SessionHandle, SessionTable};
pub use sse::{MAX_BODY_BYTES, MCP_PATH, sse_router};

#[derive(Error, Diagnostic, Debug)]
pub enum ServeError {
    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(
        code(odoo_mcp::transport::bind),
        help("Pick another --host/--port or stop the process using it.")
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server I/O error: {0}")]
    #[diagnostic(code(odoo_mcp::transport::io))]
    Io(#[from] std::io::Error),

    #[error("MCP session failed to initialize: {message}")]
    #[diagnostic(code(odoo_mcp::transport::initialize))]
    Initialize { message: String },

    #[error("MCP service task failed: {0}")]
    #[diagnostic(code(odoo_mcp::transport::join))]
    Join(#[from] tokio::task::JoinError),
}

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "odoo_mcp=info,tower_http=info";

/// Initialize tracing subscriber with env filter.
///
/// Output goes to stderr: in stdio mode stdout belongs to the protocol.
/// Returns false if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Received shutdown signal");
}

/// Run the server on the configured transport until it ends or a signal arrives.
pub async fn run<T: RpcTransport + 'static>(
    config: &ServerConfig,
    server: OdooMcpServer<T>,
) -> Result<(), ServeError> {
    match config.transport {
        Transport::Stdio => run_stdio(server).await,
        Transport::Sse => run_sse(config, server).await,
        Transport::Http => run_http(config, server).await,
    }
}

async fn run_stdio<T: RpcTransport + 'static>(server: OdooMcpServer<T>) -> Result<(), ServeError> {
    let ct = CancellationToken::new();
    info!("MCP server listening on stdio");

    let running = server
        .serve_with_ct(rmcp::transport::stdio(), ct.clone())
        .await
        .map_err(|e| ServeError::Initialize {
            message: e.to_string(),
        })?;

    tokio::select! {
        result = running.waiting() => {
            let reason = result?;
            info!(?reason, "MCP stdio session ended");
        }
        _ = shutdown_signal() => {
            ct.cancel();
        }
    }
    Ok(())
}

async fn run_sse<T: RpcTransport + 'static>(
    config: &ServerConfig,
    server: OdooMcpServer<T>,
) -> Result<(), ServeError> {
    let sessions = SessionTable::new();
    let app = sse_router(
        server,
        sessions.clone(),
        &config.sse_path,
        &config.post_path,
    )
    .layer(TraceLayer::new_for_http());

    let addr = config.bind_addr();
    info!(
        "SSE transport listening on http://{}{} (messages at {})",
        addr, config.sse_path, config.post_path
    );

    serve(&addr, app, async move {
        shutdown_signal().await;
        sessions.shutdown_all();
    })
    .await
}

async fn run_http<T: RpcTransport + 'static>(
    config: &ServerConfig,
    server: OdooMcpServer<T>,
) -> Result<(), ServeError> {
    let ct = CancellationToken::new();
    let app = Router::new()
        .nest_service(MCP_PATH, create_mcp_service(server, ct.child_token()))
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_addr();
    info!("Streamable HTTP transport listening on http://{}{}", addr, MCP_PATH);

    serve(&addr, app, async move {
        shutdown_signal().await;
        ct.cancel();
    })
    .await
}

async fn serve<F>(addr: &str, app: Router, shutdown: F) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Server shut down");
    Ok(())
}
