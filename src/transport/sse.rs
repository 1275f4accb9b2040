//! Legacy SSE transport: one event stream per client plus a POST endpoint.
//!
//! `GET {sse_path}` opens a session. Its first event is `endpoint`, telling
//! the client where to POST; every server message follows as a `message`
//! event. `POST {post_path}?sessionId=` feeds client messages to the
//! session's MCP service.

use std::convert::Infallible;

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use rmcp::{
    ServiceExt,
    model::{ClientJsonRpcMessage, ServerJsonRpcMessage},
};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};
use tokio_util::sync::{CancellationToken, PollSender};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::session::{SessionHandle, SessionTable};
use crate::mcp::OdooMcpServer;
use crate::odoo::RpcTransport;

/// Largest accepted POST body.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Path that also serves the event stream when `sse_path` is elsewhere.
pub const MCP_PATH: &str = "/mcp";

const CHANNEL_CAPACITY: usize = 64;

pub struct SseState<T: RpcTransport> {
    server: OdooMcpServer<T>,
    sessions: SessionTable,
    post_path: String,
}

impl<T: RpcTransport> Clone for SseState<T> {
    fn clone(&self) -> Self {
        Self {
            server: self.server.clone(),
            sessions: self.sessions.clone(),
            post_path: self.post_path.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Build the SSE router over a shared session table.
pub fn sse_router<T: RpcTransport + 'static>(
    server: OdooMcpServer<T>,
    sessions: SessionTable,
    sse_path: &str,
    post_path: &str,
) -> Router {
    let state = SseState {
        server,
        sessions,
        post_path: post_path.to_string(),
    };

    let mut router = Router::new().route(sse_path, get(open_stream::<T>));
    if sse_path != MCP_PATH {
        router = router.route(MCP_PATH, get(open_stream::<T>));
    }

    router
        .route(post_path, post(post_message::<T>))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Removes the session once its event stream is dropped.
struct StreamGuard {
    id: String,
    sessions: SessionTable,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if self.sessions.remove(&self.id) {
            debug!(session_id = %self.id, "SSE stream dropped");
        }
    }
}

async fn open_stream<T: RpcTransport + 'static>(
    State(state): State<SseState<T>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let id = Uuid::new_v4().to_string();
    let cancel = CancellationToken::new();

    let (client_tx, client_rx) = mpsc::channel::<ClientJsonRpcMessage>(CHANNEL_CAPACITY);
    let (server_tx, server_rx) = mpsc::channel::<ServerJsonRpcMessage>(CHANNEL_CAPACITY);

    state.sessions.insert(
        id.clone(),
        SessionHandle {
            sender: client_tx,
            cancel: cancel.clone(),
        },
    );
    info!(session_id = %id, "SSE session opened");

    let server = state.server.clone();
    let sessions = state.sessions.clone();
    let session_id = id.clone();
    tokio::spawn(async move {
        let transport = (PollSender::new(server_tx), ReceiverStream::new(client_rx));
        match server.serve_with_ct(transport, cancel).await {
            Ok(running) => {
                if let Err(e) = running.waiting().await {
                    warn!(session_id = %session_id, error = %e, "MCP service task failed");
                }
            }
            Err(e) => debug!(session_id = %session_id, error = %e, "MCP session ended before initialization"),
        }
        sessions.remove(&session_id);
    });

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("{}?sessionId={id}", state.post_path));

    let guard = StreamGuard {
        id,
        sessions: state.sessions.clone(),
    };
    let messages = ReceiverStream::new(server_rx).filter_map(move |message| {
        let _guard = &guard;
        match Event::default().event("message").json_data(&message) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                warn!(error = %e, "Dropping unserializable server message");
                None
            }
        }
    });

    Sse::new(tokio_stream::once(Ok(endpoint)).chain(messages)).keep_alive(KeepAlive::default())
}

async fn post_message<T: RpcTransport + 'static>(
    State(state): State<SseState<T>>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Response {
    let Some(session_id) = query.session_id.filter(|id| !id.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing sessionId query parameter.").into_response();
    };

    let Some(sender) = state.sessions.get(&session_id) else {
        return (StatusCode::NOT_FOUND, "Unknown session.").into_response();
    };

    let message: ClientJsonRpcMessage = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            debug!(session_id = %session_id, error = %e, "Rejected malformed message");
            return (StatusCode::BAD_REQUEST, format!("Invalid JSON-RPC message: {e}"))
                .into_response();
        }
    };

    if sender.send(message).await.is_err() {
        warn!(session_id = %session_id, "Session closed before the message was delivered");
        state.sessions.remove(&session_id);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Session is closed.").into_response();
    }

    StatusCode::ACCEPTED.into_response()
}
