//! Static documentation resources.
//!
//! Three resources are served: the project README (read from disk once and
//! memoized), a redacted summary of the Odoo environment variables, and a
//! field reference for `account.analytic.line`.

use std::env;
use std::path::PathBuf;

use miette::Diagnostic;
use rmcp::model::{AnnotateAble, RawResource, Resource};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::{ENV_API_KEY, ENV_BASE_URL, ENV_DATABASE, ENV_PASSWORD, ENV_USERNAME};

pub const README_URI: &str = "resource://odoo-mcp/docs/readme";
pub const CONFIG_URI: &str = "resource://odoo-mcp/config/environment";
pub const TIMESHEET_FIELDS_URI: &str = "resource://odoo-mcp/docs/timesheet-fields";

/// Variables listed by the environment resource, in display order.
pub const DESCRIBED_VARIABLES: [&str; 5] = [
    ENV_BASE_URL,
    ENV_DATABASE,
    ENV_USERNAME,
    ENV_PASSWORD,
    ENV_API_KEY,
];

pub const TIMESHEET_FIELD_DOC: &str = "Timesheet fields (account.analytic.line):

- name: Description of the work completed.
- date: Entry date (YYYY-MM-DD).
- unit_amount: Logged hours (float).
- employee_id: Many2one link to hr.employee.
- project_id: Many2one link to project.project.
- task_id: Many2one link to project.task.

All create/update calls rely on Odoo's XML-RPC endpoint /xmlrpc/2/object with the model 'account.analytic.line'.";

#[derive(Error, Diagnostic, Debug)]
pub enum ResourceError {
    #[error("Unknown resource: {uri}")]
    #[diagnostic(code(odoo_mcp::resources::not_found))]
    NotFound { uri: String },

    #[error("Failed to read README at {path}: {source}")]
    #[diagnostic(
        code(odoo_mcp::resources::readme),
        help("Set MCP_README_PATH or --readme to the README location.")
    )]
    Readme {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The Odoo variables as seen when the snapshot was taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    vars: Vec<(String, Option<String>)>,
}

impl EnvironmentSnapshot {
    /// Snapshot the process environment.
    pub fn capture() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            vars: DESCRIBED_VARIABLES
                .iter()
                .map(|name| (name.to_string(), lookup(name)))
                .collect(),
        }
    }

    /// One line per variable; secrets are reported as set but never shown.
    pub fn describe(&self) -> String {
        let mut lines = vec!["Required environment variables:".to_string()];
        lines.extend(self.vars.iter().map(|(name, value)| describe_var(name, value.as_deref())));
        lines.join("\n")
    }
}

fn describe_var(name: &str, value: Option<&str>) -> String {
    let upper = name.to_uppercase();
    match value {
        None | Some("") => format!("{name}: (not set)"),
        Some(_) if upper.contains("PASSWORD") || upper.contains("KEY") => {
            format!("{name}: (set, value hidden)")
        }
        Some(value) => format!("{name}: {value}"),
    }
}

/// Resource listing and lookup, shared by every session.
pub struct ResourceCatalog {
    readme_path: PathBuf,
    readme: OnceCell<String>,
    environment: EnvironmentSnapshot,
}

impl ResourceCatalog {
    pub fn new(readme_path: impl Into<PathBuf>, environment: EnvironmentSnapshot) -> Self {
        Self {
            readme_path: readme_path.into(),
            readme: OnceCell::new(),
            environment,
        }
    }

    /// Resource descriptors for `resources/list`.
    pub fn list(&self) -> Vec<Resource> {
        vec![
            resource(
                README_URI,
                "odoo-mcp-readme",
                "Project documentation shipped with this server.",
                "text/markdown",
            ),
            resource(
                CONFIG_URI,
                "odoo-mcp-config",
                "Summary of required environment configuration for the MCP server.",
                "text/plain",
            ),
            resource(
                TIMESHEET_FIELDS_URI,
                "odoo-mcp-timesheet-fields",
                "Field definitions for account.analytic.line used by the MCP server.",
                "text/markdown",
            ),
        ]
    }

    /// Text of the resource at `uri`.
    pub async fn read(&self, uri: &str) -> Result<String, ResourceError> {
        match uri {
            README_URI => self.readme().await.map(str::to_string),
            CONFIG_URI => Ok(self.environment.describe()),
            TIMESHEET_FIELDS_URI => Ok(TIMESHEET_FIELD_DOC.to_string()),
            _ => Err(ResourceError::NotFound {
                uri: uri.to_string(),
            }),
        }
    }

    async fn readme(&self) -> Result<&str, ResourceError> {
        let text = self
            .readme
            .get_or_try_init(|| async {
                debug!(path = %self.readme_path.display(), "Loading README");
                tokio::fs::read_to_string(&self.readme_path)
                    .await
                    .map_err(|source| ResourceError::Readme {
                        path: self.readme_path.display().to_string(),
                        source,
                    })
            })
            .await?;
        Ok(text.as_str())
    }
}

fn resource(uri: &str, name: &str, description: &str, mime_type: &str) -> Resource {
    let mut raw = RawResource::new(uri, name);
    raw.description = Some(description.to_string());
    raw.mime_type = Some(mime_type.to_string());
    raw.no_annotation()
}
