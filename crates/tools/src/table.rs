//! Generic record tool over one platform table.
//!
//! Each operation has a statically typed parameter struct; the dispatcher
//! validates against [`ToolParams::schema`] before serde ever sees the input.

use crate::client::TableClient;
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::schema::{ParamSchema, ParamType, ResponseKind};
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::error;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 1000;

/// Parameter type with a declared schema.
pub trait ToolParams: DeserializeOwned {
    fn schema() -> ParamSchema;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListRecordsParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    pub query: Option<String>,
    pub fields: Option<String>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl ToolParams for ListRecordsParams {
    fn schema() -> ParamSchema {
        ParamSchema::new()
            .optional("limit", ParamType::Integer, "Maximum number of records (default 10)")
            .optional("offset", ParamType::Integer, "Offset for pagination")
            .optional("query", ParamType::String, "Encoded query, e.g. active=true^priority=1")
            .optional("fields", ParamType::String, "Comma-separated fields to return")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetRecordParams {
    pub sys_id: String,
    pub fields: Option<String>,
}

impl ToolParams for GetRecordParams {
    fn schema() -> ParamSchema {
        ParamSchema::new()
            .required("sys_id", ParamType::String, "sys_id of the record")
            .optional("fields", ParamType::String, "Comma-separated fields to return")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRecordParams {
    pub values: Map<String, Value>,
}

impl ToolParams for CreateRecordParams {
    fn schema() -> ParamSchema {
        ParamSchema::new().required(
            "values",
            ParamType::Object,
            "Field values for the new record, keyed by column name",
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRecordParams {
    pub sys_id: String,
    pub values: Map<String, Value>,
}

impl ToolParams for UpdateRecordParams {
    fn schema() -> ParamSchema {
        ParamSchema::new()
            .required("sys_id", ParamType::String, "sys_id of the record to update")
            .required("values", ParamType::Object, "Field values to change")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteRecordParams {
    pub sys_id: String,
}

impl ToolParams for DeleteRecordParams {
    fn schema() -> ParamSchema {
        ParamSchema::new().required("sys_id", ParamType::String, "sys_id of the record to delete")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOperation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl TableOperation {
    pub fn params(self) -> ParamSchema {
        match self {
            TableOperation::List => ListRecordsParams::schema(),
            TableOperation::Get => GetRecordParams::schema(),
            TableOperation::Create => CreateRecordParams::schema(),
            TableOperation::Update => UpdateRecordParams::schema(),
            TableOperation::Delete => DeleteRecordParams::schema(),
        }
    }

    pub fn response(self) -> ResponseKind {
        match self {
            TableOperation::List => ResponseKind::RecordList,
            TableOperation::Get | TableOperation::Create | TableOperation::Update => {
                ResponseKind::Record
            }
            TableOperation::Delete => ResponseKind::Deletion,
        }
    }
}

/// One CRUD operation bound to one table under one tool name.
#[derive(Debug, Clone)]
pub struct TableTool {
    name: String,
    description: String,
    table: String,
    operation: TableOperation,
}

impl TableTool {
    pub fn new(name: &str, description: &str, table: &str, operation: TableOperation) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            table: table.to_string(),
            operation,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn operation(&self) -> TableOperation {
        self.operation
    }

    async fn run(&self, ctx: &ToolContext, args: Value) -> Result<ToolResult, ToolError> {
        let client = TableClient::new(ctx, &self.table);
        match self.operation {
            TableOperation::List => {
                let params: ListRecordsParams = parse(args)?;
                let mut query = vec![
                    ("sysparm_limit", params.limit.min(MAX_LIMIT).to_string()),
                    ("sysparm_offset", params.offset.to_string()),
                    ("sysparm_display_value", "true".to_string()),
                    ("sysparm_exclude_reference_link", "true".to_string()),
                ];
                if let Some(q) = params.query.filter(|q| !q.trim().is_empty()) {
                    query.push(("sysparm_query", q));
                }
                if let Some(fields) = params.fields {
                    query.push(("sysparm_fields", fields));
                }
                let records = client.list(&query).await?;
                Ok(ToolResult::ok(
                    format!("Found {} {} records", records.len(), self.table),
                    json!({"count": records.len(), "records": records}),
                ))
            }
            TableOperation::Get => {
                let params: GetRecordParams = parse(args)?;
                let sys_id = require_sys_id(&params.sys_id)?;
                let mut query = vec![("sysparm_display_value", "true".to_string())];
                if let Some(fields) = params.fields {
                    query.push(("sysparm_fields", fields));
                }
                let record = client.get(sys_id, &query).await?;
                Ok(ToolResult::ok(
                    format!("Retrieved {} record {}", self.table, sys_id),
                    record,
                ))
            }
            TableOperation::Create => {
                let params: CreateRecordParams = parse(args)?;
                if params.values.is_empty() {
                    return Err(ToolError::Validation("values must not be empty".to_string()));
                }
                let record = client.create(&Value::Object(params.values)).await?;
                let sys_id = record["sys_id"].as_str().unwrap_or_default().to_string();
                Ok(ToolResult::ok(
                    format!("Created {} record {}", self.table, sys_id),
                    record,
                ))
            }
            TableOperation::Update => {
                let params: UpdateRecordParams = parse(args)?;
                let sys_id = require_sys_id(&params.sys_id)?;
                if params.values.is_empty() {
                    return Err(ToolError::Validation("values must not be empty".to_string()));
                }
                let record = client.update(sys_id, &Value::Object(params.values)).await?;
                Ok(ToolResult::ok(
                    format!("Updated {} record {}", self.table, sys_id),
                    record,
                ))
            }
            TableOperation::Delete => {
                let params: DeleteRecordParams = parse(args)?;
                let sys_id = require_sys_id(&params.sys_id)?;
                client.delete(sys_id).await?;
                Ok(ToolResult::ok(
                    format!("Deleted {} record {}", self.table, sys_id),
                    json!({"sys_id": sys_id}),
                ))
            }
        }
    }
}

#[async_trait]
impl Tool for TableTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn params(&self) -> ParamSchema {
        self.operation.params()
    }

    fn response(&self) -> ResponseKind {
        self.operation.response()
    }

    async fn execute(&self, ctx: ToolContext, args: Value) -> ToolResult {
        match self.run(&ctx, args).await {
            Ok(result) => result,
            Err(err) => {
                error!("{} failed: {}", self.name, err);
                err.into()
            }
        }
    }
}

fn parse<P: ToolParams>(args: Value) -> Result<P, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::Validation(e.to_string()))
}

fn require_sys_id(sys_id: &str) -> Result<&str, ToolError> {
    let trimmed = sys_id.trim();
    if trimmed.is_empty() {
        return Err(ToolError::Validation("sys_id must not be empty".to_string()));
    }
    Ok(trimmed)
}
