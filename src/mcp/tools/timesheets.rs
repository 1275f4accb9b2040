//! MCP tools for Odoo timesheet lines.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError,
    handler::server::{tool::schema_for_output, wrapper::Parameters},
    model::{CallToolResult, JsonObject},
    schemars,
    schemars::JsonSchema,
    tool, tool_router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::{
    DEFAULT_LIMIT, ValidationResult, check_date, check_hours, check_id, check_limit, check_text,
    invalid_params, odoo_failure, structured, tool_failure,
};
use crate::mcp::server::OdooMcpServer;
use crate::odoo::{NewTimesheet, RpcTransport, Timesheet, TimesheetFilters, TimesheetPatch};

// =============================================================================
// Parameter Structs
// =============================================================================

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListTimesheetsParams {
    #[schemars(description = "Filter by employee ID.", range(min = 0))]
    pub employee_id: Option<i32>,
    #[schemars(description = "Filter by project ID.", range(min = 0))]
    pub project_id: Option<i32>,
    #[schemars(description = "Filter by task ID.", range(min = 0))]
    pub task_id: Option<i32>,
    #[schemars(description = "Filter by a specific entry date (YYYY-MM-DD).")]
    pub date: Option<String>,
    #[schemars(
        description = "Case-insensitive match on the description.",
        length(min = 1, max = 120)
    )]
    pub description_query: Option<String>,
    #[serde(default = "default_limit")]
    #[schemars(
        description = "Maximum number of timesheets to return (default: 20, max: 200).",
        range(min = 1, max = 200)
    )]
    pub limit: u32,
}

impl Default for ListTimesheetsParams {
    fn default() -> Self {
        Self {
            employee_id: None,
            project_id: None,
            task_id: None,
            date: None,
            description_query: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListTimesheetsParams {
    pub fn validate(&self) -> ValidationResult {
        check_id("employeeId", self.employee_id, 0)?;
        check_id("projectId", self.project_id, 0)?;
        check_id("taskId", self.task_id, 0)?;
        check_date("date", self.date.as_deref())?;
        check_text("descriptionQuery", self.description_query.as_deref())?;
        check_limit(self.limit)
    }

    pub fn filters(&self) -> TimesheetFilters {
        TimesheetFilters {
            employee_id: self.employee_id,
            project_id: self.project_id,
            task_id: self.task_id,
            date: self.date.clone(),
            description_contains: self.description_query.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimesheetParams {
    #[schemars(
        description = "Internal ID of the timesheet record to update.",
        range(min = 1)
    )]
    pub timesheet_id: i32,
    #[schemars(
        description = "New description for the entry.",
        length(min = 1, max = 120)
    )]
    pub description: Option<String>,
    #[schemars(description = "Project ID to associate with the entry.", range(min = 1))]
    pub project_id: Option<i32>,
    #[schemars(description = "Task ID to associate with the entry.", range(min = 1))]
    pub task_id: Option<i32>,
    #[schemars(
        description = "Number of hours to record for this entry.",
        range(min = 0, max = 24)
    )]
    pub hours: Option<f64>,
    #[schemars(description = "Update the entry date (YYYY-MM-DD).")]
    pub date: Option<String>,
}

impl UpdateTimesheetParams {
    pub fn validate(&self) -> ValidationResult {
        check_id("timesheetId", Some(self.timesheet_id), 1)?;
        check_text("description", self.description.as_deref())?;
        check_id("projectId", self.project_id, 1)?;
        check_id("taskId", self.task_id, 1)?;
        check_hours("hours", self.hours)?;
        check_date("date", self.date.as_deref())
    }

    pub fn patch(&self) -> TimesheetPatch {
        TimesheetPatch {
            description: self.description.clone(),
            project_id: self.project_id,
            task_id: self.task_id,
            hours: self.hours,
            date: self.date.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimesheetParams {
    #[schemars(
        description = "Employee ID for whom the entry is created.",
        range(min = 1)
    )]
    pub employee_id: i32,
    #[schemars(
        description = "Summary or label for the timesheet entry.",
        length(min = 1, max = 120)
    )]
    pub description: String,
    #[schemars(description = "Hours worked for this entry.", range(min = 0, max = 24))]
    pub hours: f64,
    #[schemars(description = "Entry date in YYYY-MM-DD.")]
    pub date: String,
    #[schemars(description = "Related project ID, if any.", range(min = 1))]
    pub project_id: Option<i32>,
    #[schemars(description = "Related task ID, if any.", range(min = 1))]
    pub task_id: Option<i32>,
}

impl CreateTimesheetParams {
    pub fn validate(&self) -> ValidationResult {
        check_id("employeeId", Some(self.employee_id), 1)?;
        check_text("description", Some(&self.description))?;
        check_hours("hours", Some(self.hours))?;
        check_date("date", Some(&self.date))?;
        check_id("projectId", self.project_id, 1)?;
        check_id("taskId", self.task_id, 1)
    }

    pub fn new_timesheet(&self) -> NewTimesheet {
        NewTimesheet {
            employee_id: self.employee_id,
            description: self.description.clone(),
            hours: self.hours,
            date: self.date.clone(),
            project_id: self.project_id,
            task_id: self.task_id,
        }
    }
}

// =============================================================================
// Output Structs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListTimesheetsOutput {
    pub timesheets: Vec<Timesheet>,
}

/// `success` is true only when the written record was read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimesheetOutput {
    pub success: bool,
    pub updated_timesheet: Option<Timesheet>,
}

/// `success` is true only when the created record was read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimesheetOutput {
    pub success: bool,
    pub created_timesheet: Option<Timesheet>,
}

// =============================================================================
// Timesheet Tools
// =============================================================================

#[tool_router(router = timesheet_router, vis = "pub(crate)")]
impl<T: RpcTransport + 'static> OdooMcpServer<T> {
    #[tool(
        description = "Search recent Odoo timesheet entries (account.analytic.line records), newest first. Filter by employee, project, task, date, or a description substring.",
        output_schema = output_schema::<ListTimesheetsOutput>()
    )]
    pub async fn list_timesheets(
        &self,
        params: Parameters<ListTimesheetsParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        params.validate().map_err(invalid_params)?;

        let records = match self
            .client()
            .find_timesheets(&params.filters(), params.limit)
            .await
        {
            Ok(records) => records,
            Err(e) => return odoo_failure("list_timesheets", e),
        };

        info!(count = records.len(), limit = params.limit, "Listed timesheets");

        structured(&ListTimesheetsOutput {
            timesheets: records.into_iter().map(Timesheet::from).collect(),
        })
    }

    #[tool(
        description = "Modify an existing timesheet entry in Odoo. Provide at least one of description, projectId, taskId, hours, or date. Returns the entry as stored after the update.",
        output_schema = output_schema::<UpdateTimesheetOutput>()
    )]
    pub async fn update_timesheet(
        &self,
        params: Parameters<UpdateTimesheetParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        params.validate().map_err(invalid_params)?;
        let id = i64::from(params.timesheet_id);

        let written = match self.client().update_timesheet(id, &params.patch()).await {
            Ok(written) => written,
            Err(e) => return odoo_failure("update_timesheet", e),
        };

        if !written {
            warn!(timesheet_id = id, "Odoo reported the write as unsuccessful");
            return structured(&UpdateTimesheetOutput {
                success: false,
                updated_timesheet: None,
            });
        }

        let updated = match self.read_back("update_timesheet:fetch", id, "updated").await {
            Ok(updated) => updated,
            Err(message) => return Ok(tool_failure(message)),
        };
        info!(timesheet_id = id, "Updated timesheet");

        structured(&UpdateTimesheetOutput {
            success: true,
            updated_timesheet: Some(updated),
        })
    }

    #[tool(
        description = "Create a new timesheet entry in Odoo for an employee. Returns the entry as stored after creation.",
        output_schema = output_schema::<CreateTimesheetOutput>()
    )]
    pub async fn create_timesheet(
        &self,
        params: Parameters<CreateTimesheetParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        params.validate().map_err(invalid_params)?;

        let id = match self.client().create_timesheet(&params.new_timesheet()).await {
            Ok(id) => id,
            Err(e) => return odoo_failure("create_timesheet", e),
        };

        let created = match self.read_back("create_timesheet:fetch", id, "created").await {
            Ok(created) => created,
            Err(message) => return Ok(tool_failure(message)),
        };
        info!(timesheet_id = id, "Created timesheet");

        structured(&CreateTimesheetOutput {
            success: true,
            created_timesheet: Some(created),
        })
    }
}

impl<T: RpcTransport + 'static> OdooMcpServer<T> {
    /// Re-read a record after a successful mutation.
    ///
    /// The mutation already happened, so a failed or empty read is reported
    /// as a failure naming the record instead of a successful null result.
    async fn read_back(&self, step: &str, id: i64, action: &str) -> Result<Timesheet, String> {
        match self.client().get_timesheet(id).await {
            Ok(Some(record)) => Ok(Timesheet::from(record)),
            Ok(None) => {
                warn!(timesheet_id = id, step, "Read-back returned no record");
                Err(format!(
                    "[{step}] timesheet {id} was {action} (mutation applied) but Odoo returned no record when reading it back"
                ))
            }
            Err(e) => {
                warn!(timesheet_id = id, step, error = %e, "Read-back failed");
                Err(format!(
                    "[{step}] timesheet {id} was {action} (mutation applied) but could not be read back: {e}"
                ))
            }
        }
    }
}

/// Output schema for a tool returning `O` as structured content.
fn output_schema<O: JsonSchema + 'static>() -> Arc<JsonObject> {
    schema_for_output::<O>().unwrap_or_else(|e| {
        error!(output = std::any::type_name::<O>(), error = %e, "Invalid tool output schema");
        Arc::new(JsonObject::new())
    })
}
