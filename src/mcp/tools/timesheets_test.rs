use std::collections::BTreeMap;

use mockall::Sequence;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, ErrorCode},
};
use serde::de::DeserializeOwned;
use xmlrpc::Value;

use super::timesheets::{
    CreateTimesheetOutput, CreateTimesheetParams, ListTimesheetsOutput, ListTimesheetsParams,
    UpdateTimesheetOutput, UpdateTimesheetParams,
};
use crate::mcp::testing::{expect_login, orm_method, record, test_server};
use crate::odoo::{Endpoint, MockRpcTransport, RpcError};

fn output<O: DeserializeOwned>(result: CallToolResult) -> O {
    assert_ne!(result.is_error, Some(true), "tool failed: {:?}", result.content);
    serde_json::from_value(result.structured_content.expect("structured content")).unwrap()
}

fn failure_text(result: &CallToolResult) -> &str {
    assert_eq!(result.is_error, Some(true));
    &result.content[0].as_text().expect("text content").text
}

fn is_orm(endpoint: &Endpoint, method: &str, params: &[Value], orm: &str) -> bool {
    *endpoint == Endpoint::Object && method == "execute_kw" && orm_method(params) == Some(orm)
}

fn kwargs(params: &[Value]) -> Option<&BTreeMap<String, Value>> {
    match params.get(6) {
        Some(Value::Struct(kwargs)) => Some(kwargs),
        _ => None,
    }
}

fn args(params: &[Value]) -> &[Value] {
    match params.get(5) {
        Some(Value::Array(args)) => args,
        _ => &[],
    }
}

fn create_params() -> CreateTimesheetParams {
    CreateTimesheetParams {
        employee_id: 7,
        description: "Fixed invoices".to_string(),
        hours: 2.5,
        date: "2024-03-01".to_string(),
        project_id: Some(3),
        task_id: None,
    }
}

// =============================================================================
// list_timesheets
// =============================================================================

#[test]
fn test_list_params_default_limit() {
    let params: ListTimesheetsParams = serde_json::from_str("{}").unwrap();
    assert_eq!(params.limit, 20);
    assert!(params.filters().domain().is_empty());

    let params: ListTimesheetsParams =
        serde_json::from_str(r#"{"employeeId": 7, "descriptionQuery": "invoice"}"#).unwrap();
    assert_eq!(params.employee_id, Some(7));
    assert_eq!(params.filters().domain().len(), 2);
}

#[tokio::test]
async fn test_list_timesheets_passes_filters_and_maps_records() {
    let mut mock = MockRpcTransport::new();
    expect_login(&mut mock, 5);
    mock.expect_call()
        .withf(|endpoint, method, params| {
            is_orm(endpoint, method, params, "search_read")
                && args(params).first()
                    == Some(&Value::Array(vec![Value::Array(vec![
                        Value::String("project_id".to_string()),
                        Value::String("=".to_string()),
                        Value::Int(3),
                    ])]))
                && kwargs(params).is_some_and(|kw| {
                    kw.get("limit") == Some(&Value::Int(10))
                        && kw.get("order") == Some(&Value::String("date desc".to_string()))
                })
        })
        .times(1)
        .returning(|_, _, _| {
            Ok(Value::Array(vec![
                record(2, "Review", "2024-03-02", 1.0),
                record(1, "Support", "2024-03-01", 2.5),
            ]))
        });

    let server = test_server(mock);
    let output: ListTimesheetsOutput = output(
        server
            .list_timesheets(Parameters(ListTimesheetsParams {
                project_id: Some(3),
                limit: 10,
                ..Default::default()
            }))
            .await
            .unwrap(),
    );

    assert_eq!(output.timesheets.len(), 2);
    let first = &output.timesheets[0];
    assert_eq!(first.id, 2);
    assert_eq!(first.description, "Review");
    assert_eq!(first.employee.as_ref().unwrap().name, "Ada Lovelace");
    assert_eq!(first.project.as_ref().unwrap().id, 3);
    assert!(first.task.is_none());
}

#[tokio::test]
async fn test_list_timesheets_rejects_bad_input_without_calling_odoo() {
    let mut mock = MockRpcTransport::new();
    mock.expect_call().never();
    let server = test_server(mock);

    let err = server
        .list_timesheets(Parameters(ListTimesheetsParams {
            limit: 500,
            ..Default::default()
        }))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

    let err = server
        .list_timesheets(Parameters(ListTimesheetsParams {
            date: Some("03/01/2024".to_string()),
            ..Default::default()
        }))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(err.message.contains("YYYY-MM-DD"));
}

#[tokio::test]
async fn test_list_timesheets_reports_remote_failure() {
    let mut mock = MockRpcTransport::new();
    expect_login(&mut mock, 5);
    mock.expect_call()
        .withf(|endpoint, method, params| is_orm(endpoint, method, params, "search_read"))
        .times(1)
        .returning(|_, _, _| {
            Err(RpcError::Fault {
                method: "execute_kw".to_string(),
                message: "Access denied".to_string(),
            })
        });

    let result = test_server(mock)
        .list_timesheets(Parameters(ListTimesheetsParams::default()))
        .await
        .unwrap();

    let text = failure_text(&result);
    assert!(text.starts_with("[list_timesheets] [search_read]"), "{text}");
    assert!(text.contains("Access denied"));
    assert!(result.structured_content.is_none());
}

// =============================================================================
// update_timesheet
// =============================================================================

#[tokio::test]
async fn test_update_without_fields_never_calls_odoo() {
    let mut mock = MockRpcTransport::new();
    mock.expect_call().never();

    let err = test_server(mock)
        .update_timesheet(Parameters(UpdateTimesheetParams {
            timesheet_id: 12,
            ..Default::default()
        }))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert_eq!(
        err.message,
        "[update_timesheet] No fields provided to update the timesheet."
    );
}

#[tokio::test]
async fn test_update_writes_then_reads_back() {
    let mut seq = Sequence::new();
    let mut mock = MockRpcTransport::new();
    mock.expect_call()
        .withf(|endpoint, method, _| *endpoint == Endpoint::Common && method == "authenticate")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(Value::Int(5)));
    mock.expect_call()
        .withf(|endpoint, method, params| {
            is_orm(endpoint, method, params, "write")
                && args(params)
                    == [
                        Value::Array(vec![Value::Int(12)]),
                        Value::Struct(BTreeMap::from([(
                            "unit_amount".to_string(),
                            Value::Double(3.0),
                        )])),
                    ]
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(Value::Bool(true)));
    mock.expect_call()
        .withf(|endpoint, method, params| {
            is_orm(endpoint, method, params, "read")
                && args(params).first() == Some(&Value::Array(vec![Value::Int(12)]))
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(Value::Array(vec![record(12, "Support", "2024-03-01", 3.0)])));

    let output: UpdateTimesheetOutput = output(
        test_server(mock)
            .update_timesheet(Parameters(UpdateTimesheetParams {
                timesheet_id: 12,
                hours: Some(3.0),
                ..Default::default()
            }))
            .await
            .unwrap(),
    );

    assert!(output.success);
    let updated = output.updated_timesheet.unwrap();
    assert_eq!(updated.id, 12);
    assert_eq!(updated.hours, 3.0);
}

#[tokio::test]
async fn test_update_rejected_by_odoo_skips_read_back() {
    let mut mock = MockRpcTransport::new();
    expect_login(&mut mock, 5);
    mock.expect_call()
        .withf(|endpoint, method, params| is_orm(endpoint, method, params, "write"))
        .times(1)
        .returning(|_, _, _| Ok(Value::Bool(false)));
    mock.expect_call()
        .withf(|endpoint, method, params| is_orm(endpoint, method, params, "read"))
        .never();

    let output: UpdateTimesheetOutput = output(
        test_server(mock)
            .update_timesheet(Parameters(UpdateTimesheetParams {
                timesheet_id: 12,
                description: Some("Renamed".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap(),
    );

    assert!(!output.success);
    assert!(output.updated_timesheet.is_none());
}

#[tokio::test]
async fn test_update_read_back_missing_is_reported() {
    let mut mock = MockRpcTransport::new();
    expect_login(&mut mock, 5);
    mock.expect_call()
        .withf(|endpoint, method, params| is_orm(endpoint, method, params, "write"))
        .times(1)
        .returning(|_, _, _| Ok(Value::Bool(true)));
    mock.expect_call()
        .withf(|endpoint, method, params| is_orm(endpoint, method, params, "read"))
        .times(1)
        .returning(|_, _, _| Ok(Value::Array(vec![])));

    let result = test_server(mock)
        .update_timesheet(Parameters(UpdateTimesheetParams {
            timesheet_id: 12,
            date: Some("2024-03-04".to_string()),
            ..Default::default()
        }))
        .await
        .unwrap();

    let text = failure_text(&result);
    assert!(text.starts_with("[update_timesheet:fetch] timesheet 12 was updated"), "{text}");
    assert!(text.contains("mutation applied"), "{text}");
}

#[tokio::test]
async fn test_update_rejects_invalid_id() {
    let mut mock = MockRpcTransport::new();
    mock.expect_call().never();

    let err = test_server(mock)
        .update_timesheet(Parameters(UpdateTimesheetParams {
            timesheet_id: 0,
            hours: Some(1.0),
            ..Default::default()
        }))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(err.message.contains("timesheetId"));
}

// =============================================================================
// create_timesheet
// =============================================================================

#[tokio::test]
async fn test_create_sends_values_and_returns_stored_record() {
    let mut seq = Sequence::new();
    let mut mock = MockRpcTransport::new();
    mock.expect_call()
        .withf(|endpoint, method, _| *endpoint == Endpoint::Common && method == "authenticate")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(Value::Int(5)));
    mock.expect_call()
        .withf(|endpoint, method, params| {
            is_orm(endpoint, method, params, "create")
                && args(params)
                    == [Value::Struct(BTreeMap::from([
                        ("date".to_string(), Value::String("2024-03-01".to_string())),
                        ("employee_id".to_string(), Value::Int(7)),
                        ("name".to_string(), Value::String("Fixed invoices".to_string())),
                        ("project_id".to_string(), Value::Int(3)),
                        ("unit_amount".to_string(), Value::Double(2.5)),
                    ]))]
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(Value::Int(41)));
    mock.expect_call()
        .withf(|endpoint, method, params| {
            is_orm(endpoint, method, params, "read")
                && args(params).first() == Some(&Value::Array(vec![Value::Int(41)]))
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| {
            Ok(Value::Array(vec![record(41, "Fixed invoices", "2024-03-01", 2.5)]))
        });

    let output: CreateTimesheetOutput = output(
        test_server(mock)
            .create_timesheet(Parameters(create_params()))
            .await
            .unwrap(),
    );

    assert!(output.success);
    let created = output.created_timesheet.unwrap();
    assert_eq!(created.id, 41);
    assert_eq!(created.description, "Fixed invoices");
    assert_eq!(created.hours, 2.5);
    assert_eq!(created.date, "2024-03-01");
    let project = created.project.as_ref().unwrap();
    assert_eq!(project.id, 3);
    assert_eq!(project.name, "Internal");
    assert_eq!(created.employee.as_ref().unwrap().id, 7);
}

#[tokio::test]
async fn test_create_read_back_failure_names_record() {
    let mut mock = MockRpcTransport::new();
    expect_login(&mut mock, 5);
    mock.expect_call()
        .withf(|endpoint, method, params| is_orm(endpoint, method, params, "create"))
        .times(1)
        .returning(|_, _, _| Ok(Value::Int(41)));
    mock.expect_call()
        .withf(|endpoint, method, params| is_orm(endpoint, method, params, "read"))
        .times(1)
        .returning(|_, _, _| {
            Err(RpcError::Status {
                status: 502,
                body: "Bad Gateway".to_string(),
            })
        });

    let result = test_server(mock)
        .create_timesheet(Parameters(create_params()))
        .await
        .unwrap();

    let text = failure_text(&result);
    assert!(text.starts_with("[create_timesheet:fetch] timesheet 41 was created"), "{text}");
    assert!(text.contains("mutation applied"), "{text}");
    assert!(text.contains("502"), "{text}");
}

#[tokio::test]
async fn test_create_validates_before_calling_odoo() {
    let mut mock = MockRpcTransport::new();
    mock.expect_call().never();
    let server = test_server(mock);

    let cases = [
        CreateTimesheetParams {
            employee_id: 0,
            ..create_params()
        },
        CreateTimesheetParams {
            description: " ".to_string(),
            ..create_params()
        },
        CreateTimesheetParams {
            hours: 25.0,
            ..create_params()
        },
        CreateTimesheetParams {
            date: "2024-13-01".to_string(),
            ..create_params()
        },
        CreateTimesheetParams {
            task_id: Some(0),
            ..create_params()
        },
    ];

    for params in cases {
        let err = server
            .create_timesheet(Parameters(params.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS, "accepted {params:?}");
    }
}
