//! Odoo connection manager.
//!
//! Owns the configuration, the transport, and the memoized user id. One
//! instance is constructed at startup and shared by every MCP session, so
//! authentication happens once per process.

use std::collections::BTreeMap;

use tokio::sync::Mutex;
use tracing::{debug, info};
use xmlrpc::Value;

use super::error::{OdooError, OdooResult};
use super::models::{
    DomainClause, NewTimesheet, TIMESHEET_FIELDS, TIMESHEET_MODEL, TIMESHEET_ORDER,
    TimesheetFilters, TimesheetPatch, TimesheetRecord, as_i64, field_list,
};
use super::transport::{Endpoint, RpcTransport};
use crate::config::OdooConfig;

/// Client for the `account.analytic.line` model of one Odoo database.
pub struct OdooClient<T: RpcTransport> {
    config: OdooConfig,
    transport: T,
    uid: Mutex<Option<i32>>,
}

impl<T: RpcTransport> OdooClient<T> {
    pub fn new(config: OdooConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            uid: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &OdooConfig {
        &self.config
    }

    /// The memoized user id, if authentication already happened.
    pub async fn cached_uid(&self) -> Option<i32> {
        *self.uid.lock().await
    }

    /// Log in and memoize the returned user id.
    ///
    /// Fails with [`OdooError::Auth`] when Odoo answers with a falsy id.
    pub async fn authenticate(&self) -> OdooResult<i32> {
        let mut uid = self.uid.lock().await;
        let fresh = self.login().await?;
        *uid = Some(fresh);
        Ok(fresh)
    }

    /// Return the memoized user id, logging in first if needed.
    ///
    /// The lock is held across the login so concurrent first calls
    /// authenticate only once.
    async fn ensure_authenticated(&self) -> OdooResult<i32> {
        let mut uid = self.uid.lock().await;
        if let Some(existing) = *uid {
            return Ok(existing);
        }
        let fresh = self.login().await?;
        *uid = Some(fresh);
        Ok(fresh)
    }

    async fn login(&self) -> OdooResult<i32> {
        let result = self
            .transport
            .call(
                Endpoint::Common,
                "authenticate",
                vec![
                    Value::String(self.config.database.clone()),
                    Value::String(self.config.username.clone()),
                    Value::String(self.config.password.clone()),
                    Value::Struct(BTreeMap::new()),
                ],
            )
            .await
            .map_err(OdooError::remote("authenticate"))?;

        let uid = as_i64(&result)
            .filter(|uid| *uid > 0)
            .and_then(|uid| i32::try_from(uid).ok())
            .ok_or(OdooError::Auth)?;

        info!(
            uid,
            database = %self.config.database,
            username = %self.config.username,
            "Authenticated with Odoo"
        );
        Ok(uid)
    }

    async fn execute_kw(
        &self,
        operation: &'static str,
        args: Vec<Value>,
        kwargs: BTreeMap<String, Value>,
    ) -> OdooResult<Value> {
        let uid = self.ensure_authenticated().await?;
        debug!(operation, model = TIMESHEET_MODEL, "execute_kw");

        self.transport
            .call(
                Endpoint::Object,
                "execute_kw",
                vec![
                    Value::String(self.config.database.clone()),
                    Value::Int(uid),
                    Value::String(self.config.password.clone()),
                    Value::String(TIMESHEET_MODEL.to_string()),
                    Value::String(operation.to_string()),
                    Value::Array(args),
                    Value::Struct(kwargs),
                ],
            )
            .await
            .map_err(OdooError::remote(operation))
    }

    /// `search_read` with a domain, field list, limit and order.
    pub async fn search_read(
        &self,
        domain: &[DomainClause],
        fields: &[&str],
        limit: u32,
        order: &str,
    ) -> OdooResult<Vec<TimesheetRecord>> {
        let domain = Value::Array(domain.iter().map(DomainClause::to_value).collect());
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        let kwargs = BTreeMap::from([
            ("limit".to_string(), Value::Int(limit)),
            ("order".to_string(), Value::String(order.to_string())),
        ]);

        let result = self
            .execute_kw("search_read", vec![domain, field_list(fields)], kwargs)
            .await?;
        decode_records("search_read", &result)
    }

    /// `write` the given field values on one record.
    pub async fn write(&self, id: i64, values: BTreeMap<String, Value>) -> OdooResult<bool> {
        let ids = Value::Array(vec![record_id(id)?]);
        let result = self
            .execute_kw("write", vec![ids, Value::Struct(values)], BTreeMap::new())
            .await?;

        match result {
            Value::Bool(written) => Ok(written),
            other => Err(OdooError::unexpected(
                "write",
                format!("expected a boolean, got {other:?}"),
            )),
        }
    }

    /// `create` one record and return its id.
    pub async fn create(&self, values: BTreeMap<String, Value>) -> OdooResult<i64> {
        let result = self
            .execute_kw("create", vec![Value::Struct(values)], BTreeMap::new())
            .await?;

        as_i64(&result).ok_or_else(|| {
            OdooError::unexpected("create", format!("expected a record id, got {result:?}"))
        })
    }

    /// `read` one record by id.
    pub async fn read(&self, id: i64, fields: &[&str]) -> OdooResult<Vec<TimesheetRecord>> {
        let ids = Value::Array(vec![record_id(id)?]);
        let result = self
            .execute_kw("read", vec![ids, field_list(fields)], BTreeMap::new())
            .await?;
        decode_records("read", &result)
    }

    /// Most recent timesheets matching `filters`, newest first.
    pub async fn find_timesheets(
        &self,
        filters: &TimesheetFilters,
        limit: u32,
    ) -> OdooResult<Vec<TimesheetRecord>> {
        self.search_read(&filters.domain(), &TIMESHEET_FIELDS, limit, TIMESHEET_ORDER)
            .await
    }

    /// Apply a partial update. An empty patch is rejected before any call.
    pub async fn update_timesheet(&self, id: i64, patch: &TimesheetPatch) -> OdooResult<bool> {
        let values = patch.values();
        if values.is_empty() {
            return Err(OdooError::NoFieldsToUpdate);
        }
        self.write(id, values).await
    }

    /// Create a timesheet line and return its id.
    pub async fn create_timesheet(&self, timesheet: &NewTimesheet) -> OdooResult<i64> {
        self.create(timesheet.values()).await
    }

    /// Fetch one timesheet line, `None` if Odoo returns no record.
    pub async fn get_timesheet(&self, id: i64) -> OdooResult<Option<TimesheetRecord>> {
        let records = self.read(id, &TIMESHEET_FIELDS).await?;
        Ok(records.into_iter().next())
    }
}

fn record_id(id: i64) -> OdooResult<Value> {
    i32::try_from(id)
        .map(Value::Int)
        .map_err(|_| OdooError::InvalidId { id })
}

fn decode_records(operation: &'static str, value: &Value) -> OdooResult<Vec<TimesheetRecord>> {
    let Value::Array(items) = value else {
        return Err(OdooError::unexpected(
            operation,
            format!("expected a list of records, got {value:?}"),
        ));
    };
    items
        .iter()
        .map(|item| {
            TimesheetRecord::from_value(item).map_err(|e| OdooError::unexpected(operation, e))
        })
        .collect()
}
