//! Fixtures shared by MCP and transport tests.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use xmlrpc::Value;

use super::resources::{EnvironmentSnapshot, ResourceCatalog};
use super::server::OdooMcpServer;
use crate::config::OdooConfig;
use crate::odoo::{Endpoint, MockRpcTransport, OdooClient};

pub(crate) fn odoo_config() -> OdooConfig {
    OdooConfig {
        base_url: "https://acme.odoo.com".to_string(),
        database: "acme".to_string(),
        username: "bot".to_string(),
        password: "pw".to_string(),
    }
}

pub(crate) fn server_with_readme(
    mock: MockRpcTransport,
    readme: &Path,
) -> OdooMcpServer<MockRpcTransport> {
    let client = Arc::new(OdooClient::new(odoo_config(), mock));
    let resources = Arc::new(ResourceCatalog::new(readme, EnvironmentSnapshot::default()));
    OdooMcpServer::new(client, resources)
}

pub(crate) fn test_server(mock: MockRpcTransport) -> OdooMcpServer<MockRpcTransport> {
    server_with_readme(mock, Path::new("/nonexistent/README.md"))
}

/// Expect exactly one `authenticate` call answering `uid`.
pub(crate) fn expect_login(mock: &mut MockRpcTransport, uid: i32) {
    mock.expect_call()
        .withf(|endpoint, method, _| *endpoint == Endpoint::Common && method == "authenticate")
        .times(1)
        .returning(move |_, _, _| Ok(Value::Int(uid)));
}

/// The ORM method of an `execute_kw` call.
pub(crate) fn orm_method(params: &[Value]) -> Option<&str> {
    match params.get(4) {
        Some(Value::String(method)) => Some(method.as_str()),
        _ => None,
    }
}

pub(crate) fn reference(id: i32, name: &str) -> Value {
    Value::Array(vec![Value::Int(id), Value::String(name.to_string())])
}

pub(crate) fn record(id: i32, name: &str, date: &str, hours: f64) -> Value {
    Value::Struct(BTreeMap::from([
        ("id".to_string(), Value::Int(id)),
        ("name".to_string(), Value::String(name.to_string())),
        ("date".to_string(), Value::String(date.to_string())),
        ("unit_amount".to_string(), Value::Double(hours)),
        ("employee_id".to_string(), reference(7, "Ada Lovelace")),
        ("project_id".to_string(), reference(3, "Internal")),
        ("task_id".to_string(), Value::Bool(false)),
    ]))
}
