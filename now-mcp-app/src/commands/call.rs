use anyhow::{Context, Result};
use now_mcp_tools::{Dispatcher, ToolResult};
use serde_json::Value;

/// Invokes one tool and prints its result. An absent argument string means `{}`.
pub async fn run(dispatcher: &Dispatcher, name: &str, arguments: Option<&str>) -> Result<ToolResult> {
    let arguments = match arguments {
        Some(raw) => serde_json::from_str(raw).context("arguments must be valid JSON")?,
        None => Value::Null,
    };

    let result = dispatcher.invoke(name, arguments).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result)
}
