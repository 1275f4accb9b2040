//! XML-RPC transport.
//!
//! [`RpcTransport`] is the seam between [`OdooClient`](super::OdooClient)
//! and the network. [`HttpTransport`] is the real implementation: requests
//! and responses are encoded by the `xmlrpc` crate, the HTTP exchange goes
//! through reqwest.

use std::io::Cursor;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tracing::debug;
use xmlrpc::Value;

use super::error::RpcError;
use crate::config::{ConfigResult, OdooConfig};

#[cfg(test)]
use mockall::automock;

pub const COMMON_PATH: &str = "/xmlrpc/2/common";
pub const OBJECT_PATH: &str = "/xmlrpc/2/object";

/// The two Odoo XML-RPC services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/xmlrpc/2/common`: login and version
    Common,
    /// `/xmlrpc/2/object`: `execute_kw`
    Object,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Common => COMMON_PATH,
            Self::Object => OBJECT_PATH,
        }
    }
}

/// One XML-RPC method call against an Odoo endpoint. Can be mocked in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Call `method` with positional `params` and return the decoded result.
    async fn call(
        &self,
        endpoint: Endpoint,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, RpcError>;
}

/// XML-RPC over HTTP(S) using reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    common_url: Url,
    object_url: Url,
}

impl HttpTransport {
    /// Resolve both endpoint URLs from the configured base URL.
    pub fn new(config: &OdooConfig) -> ConfigResult<Self> {
        Ok(Self {
            client: Client::new(),
            common_url: config.endpoint_url(Endpoint::Common.path())?,
            object_url: config.endpoint_url(Endpoint::Object.path())?,
        })
    }

    /// Full URL of an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Common => &self.common_url,
            Endpoint::Object => &self.object_url,
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(
        &self,
        endpoint: Endpoint,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, RpcError> {
        let request = params
            .into_iter()
            .fold(xmlrpc::Request::new(method), |request, param| {
                request.arg(param)
            });

        let mut body = Vec::new();
        request
            .write_as_xml(&mut body)
            .map_err(|e| RpcError::Encode {
                method: method.to_string(),
                message: e.to_string(),
            })?;

        let url = self.url(endpoint).clone();
        debug!(%url, method, "XML-RPC call");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RpcError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload = response.bytes().await?;
        decode_response(&request, method, payload.to_vec())
    }
}

/// Decode an XML-RPC response body (value or fault) for `request`.
pub(crate) fn decode_response(
    request: &xmlrpc::Request<'_>,
    method: &str,
    payload: Vec<u8>,
) -> Result<Value, RpcError> {
    request
        .call(BufferedResponse(payload))
        .map_err(|e| RpcError::Fault {
            method: method.to_string(),
            message: e.to_string(),
        })
}

/// Hands an already received body to the `xmlrpc` response parser.
struct BufferedResponse(Vec<u8>);

impl xmlrpc::Transport for BufferedResponse {
    type Stream = Cursor<Vec<u8>>;

    fn transmit(
        self,
        _request: &xmlrpc::Request<'_>,
    ) -> Result<Self::Stream, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Cursor::new(self.0))
    }
}
