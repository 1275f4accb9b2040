//! Timesheet entities and their XML-RPC encodings.
//!
//! Odoo owns the schema (`account.analytic.line`); this module only maps
//! between its flat records and the nested JSON returned to MCP clients.

use std::collections::BTreeMap;

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use xmlrpc::Value;

/// Odoo model backing timesheet lines.
pub const TIMESHEET_MODEL: &str = "account.analytic.line";

/// Fields requested for every timesheet read.
pub const TIMESHEET_FIELDS: [&str; 7] = [
    "id",
    "name",
    "date",
    "employee_id",
    "project_id",
    "task_id",
    "unit_amount",
];

/// Sort order for timesheet searches.
pub const TIMESHEET_ORDER: &str = "date desc";

/// A resolved Many2one reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Reference {
    pub id: i64,
    pub name: String,
}

impl Reference {
    /// Normalize a Many2one value: `[id, "name"]` becomes a reference,
    /// anything else (`false`, nil, malformed) is absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        let Value::Array(items) = value else {
            return None;
        };
        match items.as_slice() {
            [id, Value::String(name), ..] => Some(Self {
                id: as_i64(id)?,
                name: name.clone(),
            }),
            _ => None,
        }
    }
}

/// A timesheet line exactly as Odoo returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimesheetRecord {
    pub id: i64,
    pub name: String,
    pub date: String,
    pub unit_amount: f64,
    pub employee_id: Option<Reference>,
    pub project_id: Option<Reference>,
    pub task_id: Option<Reference>,
}

impl TimesheetRecord {
    /// Decode one record struct from a `search_read`/`read` result.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let Value::Struct(fields) = value else {
            return Err(format!("expected a record struct, got {value:?}"));
        };

        let id = fields
            .get("id")
            .and_then(as_i64)
            .ok_or_else(|| "record has no integer id".to_string())?;

        let reference = |name: &str| fields.get(name).and_then(Reference::from_value);

        Ok(Self {
            id,
            name: fields.get("name").map(as_text).unwrap_or_default(),
            date: fields.get("date").map(as_text).unwrap_or_default(),
            unit_amount: fields.get("unit_amount").and_then(as_f64).unwrap_or(0.0),
            employee_id: reference("employee_id"),
            project_id: reference("project_id"),
            task_id: reference("task_id"),
        })
    }
}

/// Timesheet entry as exposed to MCP clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Timesheet {
    pub id: i64,
    pub description: String,
    pub date: String,
    pub hours: f64,
    pub employee: Option<Reference>,
    pub project: Option<Reference>,
    pub task: Option<Reference>,
}

impl From<TimesheetRecord> for Timesheet {
    fn from(record: TimesheetRecord) -> Self {
        Self {
            id: record.id,
            description: record.name,
            date: record.date,
            hours: record.unit_amount,
            employee: record.employee_id,
            project: record.project_id,
            task: record.task_id,
        }
    }
}

/// One `(field, operator, value)` term of an Odoo domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainClause {
    pub field: &'static str,
    pub operator: &'static str,
    pub value: Value,
}

impl DomainClause {
    pub fn new(field: &'static str, operator: &'static str, value: Value) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::String(self.field.to_string()),
            Value::String(self.operator.to_string()),
            self.value.clone(),
        ])
    }
}

/// Search filters for `list_timesheets`. Unset filters add no clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimesheetFilters {
    pub employee_id: Option<i32>,
    pub project_id: Option<i32>,
    pub task_id: Option<i32>,
    pub date: Option<String>,
    pub description_contains: Option<String>,
}

impl TimesheetFilters {
    /// One clause per supplied filter: equality, except a case-insensitive
    /// substring match (`ilike`) on the description.
    pub fn domain(&self) -> Vec<DomainClause> {
        let mut domain = Vec::new();
        if let Some(id) = self.employee_id {
            domain.push(DomainClause::new("employee_id", "=", Value::Int(id)));
        }
        if let Some(id) = self.project_id {
            domain.push(DomainClause::new("project_id", "=", Value::Int(id)));
        }
        if let Some(id) = self.task_id {
            domain.push(DomainClause::new("task_id", "=", Value::Int(id)));
        }
        if let Some(date) = self.date.as_ref().filter(|d| !d.is_empty()) {
            domain.push(DomainClause::new("date", "=", Value::String(date.clone())));
        }
        if let Some(query) = self.description_contains.as_ref().filter(|q| !q.is_empty()) {
            domain.push(DomainClause::new("name", "ilike", Value::String(query.clone())));
        }
        domain
    }
}

/// Partial update of a timesheet line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimesheetPatch {
    pub description: Option<String>,
    pub project_id: Option<i32>,
    pub task_id: Option<i32>,
    pub hours: Option<f64>,
    pub date: Option<String>,
}

impl TimesheetPatch {
    /// Odoo field values for `write`. Empty when nothing is set.
    pub fn values(&self) -> BTreeMap<String, Value> {
        let mut values = BTreeMap::new();
        if let Some(description) = &self.description {
            values.insert("name".to_string(), Value::String(description.clone()));
        }
        if let Some(id) = self.project_id {
            values.insert("project_id".to_string(), Value::Int(id));
        }
        if let Some(id) = self.task_id {
            values.insert("task_id".to_string(), Value::Int(id));
        }
        if let Some(hours) = self.hours {
            values.insert("unit_amount".to_string(), Value::Double(hours));
        }
        if let Some(date) = &self.date {
            values.insert("date".to_string(), Value::String(date.clone()));
        }
        values
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

/// A timesheet line to create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimesheet {
    pub employee_id: i32,
    pub description: String,
    pub hours: f64,
    pub date: String,
    pub project_id: Option<i32>,
    pub task_id: Option<i32>,
}

impl NewTimesheet {
    /// Odoo field values for `create`.
    pub fn values(&self) -> BTreeMap<String, Value> {
        let mut values = BTreeMap::from([
            ("name".to_string(), Value::String(self.description.clone())),
            ("date".to_string(), Value::String(self.date.clone())),
            ("employee_id".to_string(), Value::Int(self.employee_id)),
            ("unit_amount".to_string(), Value::Double(self.hours)),
        ]);
        if let Some(id) = self.project_id {
            values.insert("project_id".to_string(), Value::Int(id));
        }
        if let Some(id) = self.task_id {
            values.insert("task_id".to_string(), Value::Int(id));
        }
        values
    }
}

/// Integer view of an XML-RPC value.
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(i64::from(*i)),
        Value::Int64(i) => Some(*i),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Double(f) => Some(*f),
        Value::Int(i) => Some(f64::from(*i)),
        Value::Int64(i) => Some(*i as f64),
        _ => None,
    }
}

// Odoo sends `false` for empty char/date fields.
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

/// Encode a list of field names.
pub(crate) fn field_list(fields: &[&str]) -> Value {
    Value::Array(
        fields
            .iter()
            .map(|field| Value::String(field.to_string()))
            .collect(),
    )
}
