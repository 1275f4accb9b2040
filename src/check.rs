//! Connection check behind the `odoo-mcp-check` binary.

use tabled::{Table, Tabled, settings::Style};

use crate::odoo::{OdooClient, OdooResult, Reference, RpcTransport, Timesheet, TimesheetFilters};

/// Timesheets shown by the check.
pub const CHECK_LIMIT: u32 = 5;

const DESCRIPTION_WIDTH: usize = 40;

#[derive(Tabled)]
struct TimesheetDisplay {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "Employee")]
    employee: String,
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Timesheet> for TimesheetDisplay {
    fn from(timesheet: &Timesheet) -> Self {
        let name = |reference: &Option<Reference>| {
            reference
                .as_ref()
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "-".to_string())
        };
        Self {
            id: timesheet.id,
            date: timesheet.date.clone(),
            hours: format!("{:.2}", timesheet.hours),
            employee: name(&timesheet.employee),
            project: name(&timesheet.project),
            description: truncate_with_ellipsis(&timesheet.description, DESCRIPTION_WIDTH),
        }
    }
}

/// Truncate a string with ellipsis if it exceeds max length
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

pub fn format_table(timesheets: &[Timesheet]) -> String {
    if timesheets.is_empty() {
        return "No timesheets found.".to_string();
    }

    let display: Vec<TimesheetDisplay> = timesheets.iter().map(TimesheetDisplay::from).collect();
    let mut table = Table::new(display);
    table.with(Style::rounded());
    table.to_string()
}

/// Authenticate, then render the most recent timesheets.
pub async fn run<T: RpcTransport>(client: &OdooClient<T>) -> OdooResult<String> {
    let uid = client.authenticate().await?;
    let records = client
        .find_timesheets(&TimesheetFilters::default(), CHECK_LIMIT)
        .await?;
    let timesheets: Vec<Timesheet> = records.into_iter().map(Timesheet::from).collect();

    Ok(format!(
        "Authenticated as uid {uid} on {} ({})\n{}",
        client.config().database,
        client.config().base_url,
        format_table(&timesheets)
    ))
}
