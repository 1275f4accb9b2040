//! Live SSE sessions keyed by session id.

use std::sync::Arc;

use dashmap::DashMap;
use rmcp::model::ClientJsonRpcMessage;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Inbound side of one SSE session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Delivers POSTed client messages to the session's MCP service
    pub sender: mpsc::Sender<ClientJsonRpcMessage>,
    /// Stops the session's MCP service
    pub cancel: CancellationToken,
}

/// Shared map of open sessions. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct SessionTable {
    sessions: Arc<DashMap<String, SessionHandle>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: impl Into<String>, handle: SessionHandle) {
        self.sessions.insert(id.into(), handle);
    }

    /// Sender for the session, if it is still open.
    pub fn get(&self, id: &str) -> Option<mpsc::Sender<ClientJsonRpcMessage>> {
        self.sessions.get(id).map(|entry| entry.sender.clone())
    }

    /// Remove a session and cancel its service. Returns false if it was already gone.
    pub fn remove(&self, id: &str) -> bool {
        match self.sessions.remove(id) {
            Some((_, handle)) => {
                handle.cancel.cancel();
                debug!(session_id = %id, "Session closed");
                true
            }
            None => false,
        }
    }

    /// Stop the session's service. The session leaves the table once the
    /// service has wound down. Returns false for an unknown id.
    pub fn cancel(&self, id: &str) -> bool {
        match self.sessions.get(id) {
            Some(entry) => {
                entry.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Cancel every session and clear the table.
    pub fn shutdown_all(&self) {
        let ids: Vec<String> = self.sessions.iter().map(|entry| entry.key().clone()).collect();
        for id in &ids {
            self.remove(id);
        }
        debug!(count = ids.len(), "All sessions shut down");
    }
}
