//! MCP server implementation
//!
//! `OdooMcpServer` is the `ServerHandler` handed to every transport. It is
//! cheap to clone: the Odoo connection and the resource catalog are shared
//! behind `Arc`s, so all sessions reuse one authenticated client.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{
        Implementation, ListResourcesResult, PaginatedRequestParams, ReadResourceRequestParams,
        ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool_handler,
};
use serde_json::json;

use super::resources::{ResourceCatalog, ResourceError};
use crate::odoo::{OdooClient, RpcTransport};

pub const SERVER_NAME: &str = "odoo-mcp-server";

/// Main MCP server coordinator
///
/// Generic over `T: RpcTransport` so tests can drive the tools with a mocked
/// XML-RPC transport.
pub struct OdooMcpServer<T: RpcTransport> {
    client: Arc<OdooClient<T>>,
    resources: Arc<ResourceCatalog>,
    tool_router: ToolRouter<Self>,
}

// Manual Clone impl: only the Arcs are cloned, T need not be Clone.
impl<T: RpcTransport> Clone for OdooMcpServer<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            resources: Arc::clone(&self.resources),
            tool_router: self.tool_router.clone(),
        }
    }
}

impl<T: RpcTransport + 'static> OdooMcpServer<T> {
    /// Create a server over a shared client and resource catalog.
    pub fn new(client: Arc<OdooClient<T>>, resources: Arc<ResourceCatalog>) -> Self {
        Self {
            client,
            resources,
            tool_router: Self::timesheet_router(),
        }
    }

    pub fn client(&self) -> &OdooClient<T> {
        &self.client
    }

    pub fn resources(&self) -> &ResourceCatalog {
        &self.resources
    }

    /// Resolve a resource URI into its contents.
    pub async fn resource_contents(&self, uri: &str) -> Result<ResourceContents, McpError> {
        let text = self.resources.read(uri).await.map_err(|e| match e {
            ResourceError::NotFound { .. } => {
                McpError::resource_not_found(e.to_string(), Some(json!({ "uri": uri })))
            }
            ResourceError::Readme { .. } => McpError::internal_error(e.to_string(), None),
        })?;
        Ok(ResourceContents::text(text, uri))
    }
}

#[tool_handler(router = self.tool_router)]
impl<T: RpcTransport + 'static> ServerHandler for OdooMcpServer<T> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(
            ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
        )
        .with_server_info(Implementation::new(
            SERVER_NAME.to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        ))
        .with_instructions(
            "Odoo MCP Server - List, create and update timesheet entries (account.analytic.line) in Odoo. Read resource://odoo-mcp/docs/timesheet-fields for the field reference."
                .to_string(),
        )
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(self.resources.list()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let contents = self.resource_contents(&request.uri).await?;
        Ok(ReadResourceResult::new(vec![contents]))
    }
}
