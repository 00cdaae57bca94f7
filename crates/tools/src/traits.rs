use crate::context::ToolContext;
use crate::error::{ErrorKind, ToolError};
use crate::schema::{ParamSchema, ResponseKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured response returned for every tool call, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl ToolResult {
    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(kind),
        }
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        let mut result = ToolResult::failure(err.kind(), err.to_string());
        if let ToolError::InvalidArguments(errors) = &err {
            result.data = Some(json!({ "errors": errors }));
        }
        result
    }
}

/// A tool module: one callable remote-platform operation plus its schema.
///
/// Implementations translate their own failures into `success=false`
/// results; `execute` never errors.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn params(&self) -> ParamSchema;
    fn response(&self) -> ResponseKind {
        ResponseKind::Record
    }

    async fn execute(&self, ctx: ToolContext, args: Value) -> ToolResult;
}
