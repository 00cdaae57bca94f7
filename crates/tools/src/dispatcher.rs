use crate::context::ToolContext;
use crate::error::ToolError;
use crate::packages::{ExposedToolSet, PackageCatalog};
use crate::registry::{ToolEntry, ToolRegistry};
use crate::schema::ResponseKind;
use crate::traits::{Tool, ToolResult};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

/// Headroom on top of the HTTP timeout before a tool task is abandoned.
const EXECUTION_GRACE_MS: u64 = 5_000;

/// One entry of the advertised tool list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolListing {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    pub response: ResponseKind,
}

/// Routes tool calls through the capability gate, argument validation and
/// protected execution. Always answers with a [`ToolResult`].
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    catalog: Arc<PackageCatalog>,
    exposed: Arc<ExposedToolSet>,
    ctx: ToolContext,
    timeout_ms: u64,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ToolRegistry>,
        catalog: Arc<PackageCatalog>,
        exposed: Arc<ExposedToolSet>,
        ctx: ToolContext,
    ) -> Self {
        let timeout_ms = ctx.config.timeout().as_millis() as u64 + EXECUTION_GRACE_MS;
        Self {
            registry,
            catalog,
            exposed,
            ctx,
            timeout_ms,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn exposed(&self) -> &ExposedToolSet {
        &self.exposed
    }

    /// Exposed tools with their schemas, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolListing> {
        self.registry
            .descriptors()
            .filter(|d| self.exposed.contains(&d.name))
            .map(|d| ToolListing {
                name: d.name.clone(),
                description: d.description.clone(),
                input_schema: d.params.to_json_schema(),
                response: d.response,
            })
            .collect()
    }

    pub async fn invoke(&self, name: &str, arguments: Value) -> ToolResult {
        let started = Instant::now();
        debug!("Invoking {} with arguments {}", name, arguments);

        let result = match self.route(name, arguments).await {
            Ok(result) => result,
            Err(err) => err.into(),
        };

        info!(
            tool = name,
            success = result.success,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tool call finished"
        );
        result
    }

    async fn route(&self, name: &str, arguments: Value) -> Result<ToolResult, ToolError> {
        // Hidden tools are indistinguishable from unknown ones.
        if !self.exposed.contains(name) {
            warn!("Rejected call to unexposed tool '{}'", name);
            return Err(ToolError::NotFound(name.to_string()));
        }
        let descriptor = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let arguments = descriptor
            .params
            .validate(&arguments)
            .map_err(ToolError::InvalidArguments)?;

        match &descriptor.entry {
            ToolEntry::PackageListing => Ok(self.package_listing()),
            ToolEntry::Module(tool) => self.execute_with_protection(tool.clone(), arguments).await,
        }
    }

    fn package_listing(&self) -> ToolResult {
        let current = self.exposed.package();
        ToolResult::ok(
            format!("Current tool package: {}", current),
            json!({
                "current_package": current,
                "requested_package": self.exposed.requested(),
                "available_packages": self.catalog.names(),
                "exposed_tool_count": self.exposed.len(),
            }),
        )
    }

    async fn execute_with_protection(
        &self,
        tool: Arc<dyn Tool>,
        arguments: Value,
    ) -> Result<ToolResult, ToolError> {
        let ctx = self.ctx.clone();
        let mut handle = tokio::spawn(async move { tool.execute(ctx, arguments).await });

        match timeout(Duration::from_millis(self.timeout_ms), &mut handle).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(join_err)) => {
                if join_err.is_panic() {
                    error!("Tool execution panicked");
                } else {
                    error!("Tool execution cancelled");
                }
                Err(ToolError::Internal)
            }
            Err(_) => {
                handle.abort();
                warn!("Tool execution timed out after {}ms", self.timeout_ms);
                Err(ToolError::Timeout(self.timeout_ms as u128))
            }
        }
    }
}
