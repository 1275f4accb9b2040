use std::fs;

use tempfile::TempDir;

use super::resources::{
    CONFIG_URI, EnvironmentSnapshot, README_URI, ResourceCatalog, ResourceError,
    TIMESHEET_FIELDS_URI,
};

fn snapshot(vars: &[(&str, &str)]) -> EnvironmentSnapshot {
    let vars: Vec<(String, String)> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EnvironmentSnapshot::from_lookup(|name| {
        vars.iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    })
}

#[test]
fn test_list_exposes_three_resources() {
    let catalog = ResourceCatalog::new("README.md", EnvironmentSnapshot::default());
    let uris: Vec<String> = catalog.list().into_iter().map(|r| r.raw.uri).collect();

    assert_eq!(uris, vec![README_URI, CONFIG_URI, TIMESHEET_FIELDS_URI]);
}

#[test]
fn test_environment_redacts_secrets() {
    let text = snapshot(&[
        ("ODOO_BASE_URL", "https://acme.odoo.com"),
        ("ODOO_DATABASE", "acme"),
        ("ODOO_PASSWORD", "hunter2"),
        ("ODOO_API_KEY", ""),
    ])
    .describe();

    assert!(text.starts_with("Required environment variables:\n"));
    assert!(text.contains("ODOO_BASE_URL: https://acme.odoo.com"));
    assert!(text.contains("ODOO_DATABASE: acme"));
    assert!(text.contains("ODOO_USERNAME: (not set)"));
    assert!(text.contains("ODOO_PASSWORD: (set, value hidden)"));
    assert!(text.contains("ODOO_API_KEY: (not set)"));
    assert!(!text.contains("hunter2"));
}

#[tokio::test]
async fn test_read_static_resources() {
    let catalog = ResourceCatalog::new(
        "README.md",
        snapshot(&[("ODOO_USERNAME", "bot")]),
    );

    let fields = catalog.read(TIMESHEET_FIELDS_URI).await.unwrap();
    assert!(fields.contains("unit_amount"));
    assert!(fields.contains("account.analytic.line"));

    let config = catalog.read(CONFIG_URI).await.unwrap();
    assert!(config.contains("ODOO_USERNAME: bot"));
}

#[tokio::test]
async fn test_readme_is_read_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("README.md");
    fs::write(&path, "# Odoo MCP\n").unwrap();

    let catalog = ResourceCatalog::new(&path, EnvironmentSnapshot::default());
    assert_eq!(catalog.read(README_URI).await.unwrap(), "# Odoo MCP\n");

    fs::write(&path, "changed").unwrap();
    assert_eq!(catalog.read(README_URI).await.unwrap(), "# Odoo MCP\n");
}

#[tokio::test]
async fn test_missing_readme_is_an_error() {
    let dir = TempDir::new().unwrap();
    let catalog = ResourceCatalog::new(dir.path().join("missing.md"), EnvironmentSnapshot::default());

    let err = catalog.read(README_URI).await.unwrap_err();
    assert!(matches!(err, ResourceError::Readme { .. }), "{err}");
}

#[tokio::test]
async fn test_unknown_uri_is_not_found() {
    let catalog = ResourceCatalog::new("README.md", EnvironmentSnapshot::default());

    let err = catalog.read("resource://odoo-mcp/nope").await.unwrap_err();
    assert!(matches!(err, ResourceError::NotFound { ref uri } if uri == "resource://odoo-mcp/nope"));
}
