//! Thin client for the `/api/now/table/{table}` REST endpoints.

use crate::context::ToolContext;
use crate::error::{RemoteCallError, ToolError};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

const MAX_ERROR_MESSAGE: usize = 300;

pub struct TableClient<'a> {
    ctx: &'a ToolContext,
    table: &'a str,
}

impl<'a> TableClient<'a> {
    pub fn new(ctx: &'a ToolContext, table: &'a str) -> Self {
        Self { ctx, table }
    }

    pub async fn list(&self, query: &[(&str, String)]) -> Result<Vec<Value>, ToolError> {
        match self.send(Method::GET, None, query, None).await? {
            Some(Value::Array(records)) => Ok(records),
            Some(other) => Err(RemoteCallError::Malformed(format!(
                "expected a list of records, got {}",
                short_type(&other)
            ))
            .into()),
            None => Ok(Vec::new()),
        }
    }

    pub async fn get(&self, sys_id: &str, query: &[(&str, String)]) -> Result<Value, ToolError> {
        self.send(Method::GET, Some(sys_id), query, None)
            .await?
            .ok_or_else(|| RemoteCallError::Malformed("empty response".to_string()).into())
    }

    pub async fn create(&self, body: &Value) -> Result<Value, ToolError> {
        self.send(Method::POST, None, &[], Some(body))
            .await?
            .ok_or_else(|| RemoteCallError::Malformed("empty response".to_string()).into())
    }

    pub async fn update(&self, sys_id: &str, body: &Value) -> Result<Value, ToolError> {
        self.send(Method::PATCH, Some(sys_id), &[], Some(body))
            .await?
            .ok_or_else(|| RemoteCallError::Malformed("empty response".to_string()).into())
    }

    pub async fn delete(&self, sys_id: &str) -> Result<(), ToolError> {
        self.send(Method::DELETE, Some(sys_id), &[], None).await?;
        Ok(())
    }

    fn url(&self, sys_id: Option<&str>) -> Result<Url, RemoteCallError> {
        let mut url = Url::parse(&self.ctx.config.api_url())
            .map_err(|e| RemoteCallError::Transport(format!("invalid instance URL: {}", e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RemoteCallError::Transport("instance URL cannot be a base".into()))?;
            segments.pop_if_empty().push("table").push(self.table);
            if let Some(sys_id) = sys_id {
                segments.push(sys_id);
            }
        }
        Ok(url)
    }

    /// Sends one request and unwraps the `result` envelope.
    /// `Ok(None)` means the platform returned no body (e.g. 204 on delete).
    async fn send(
        &self,
        method: Method,
        sys_id: Option<&str>,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Option<Value>, ToolError> {
        let headers = self.ctx.auth.get_headers().await?;
        let url = self.url(sys_id)?;
        debug!("{} {}", method, url);

        let mut request = self
            .ctx
            .http
            .request(method, url)
            .headers(headers)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(RemoteCallError::from)?;
        let status = response.status();
        let text = response.text().await.map_err(RemoteCallError::from)?;

        if !status.is_success() {
            return Err(RemoteCallError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            }
            .into());
        }
        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(None);
        }

        let mut envelope: Value =
            serde_json::from_str(&text).map_err(|e| RemoteCallError::Malformed(e.to_string()))?;
        match envelope.get_mut("result") {
            Some(result) => Ok(Some(result.take())),
            None => Err(RemoteCallError::Malformed("missing 'result' envelope".to_string()).into()),
        }
    }
}

/// Prefers the platform's `{"error": {"message", "detail"}}` body over raw text.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let error = &value["error"];
        if let Some(message) = error["message"].as_str() {
            return match error["detail"].as_str().filter(|d| !d.is_empty()) {
                Some(detail) => format!("{} ({})", message, detail),
                None => message.to_string(),
            };
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no response body".to_string();
    }
    trimmed.chars().take(MAX_ERROR_MESSAGE).collect()
}

fn short_type(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "an object",
        Value::Array(_) => "an array",
        Value::String(_) => "a string",
        _ => "a scalar",
    }
}
