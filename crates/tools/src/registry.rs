use crate::schema::{ParamSchema, ResponseKind};
use crate::traits::Tool;
use now_mcp_core::ConfigError;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Name of the always-present package introspection tool.
pub const LIST_TOOL_PACKAGES: &str = "list_tool_packages";
const INTROSPECTION_GROUP: &str = "builtin";

/// A named bundle of tool modules, enumerated at compile time.
pub struct ToolGroup {
    name: String,
    modules: Vec<Arc<dyn Tool>>,
}

impl ToolGroup {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            modules: Vec::new(),
        }
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.modules.push(tool);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// How a descriptor is executed.
#[derive(Clone)]
pub enum ToolEntry {
    Module(Arc<dyn Tool>),
    /// Answered by the dispatcher from the package catalog.
    PackageListing,
}

#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub group: String,
    pub params: ParamSchema,
    pub response: ResponseKind,
    pub entry: ToolEntry,
}

impl ToolDescriptor {
    fn package_listing() -> Self {
        Self {
            name: LIST_TOOL_PACKAGES.to_string(),
            description: "List the available tool packages and the one currently loaded"
                .to_string(),
            group: INTROSPECTION_GROUP.to_string(),
            params: ParamSchema::new(),
            response: ResponseKind::PackageListing,
            entry: ToolEntry::PackageListing,
        }
    }

    fn from_module(group: &str, tool: Arc<dyn Tool>) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            group: group.to_string(),
            params: tool.params(),
            response: tool.response(),
            entry: ToolEntry::Module(tool),
        }
    }
}

/// Every discovered tool, keyed by unique name. Read-only after discovery.
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    /// Registers every module of every group.
    ///
    /// Malformed modules are skipped with a warning. A name claimed twice
    /// (including the reserved introspection name) aborts discovery.
    pub fn discover(groups: Vec<ToolGroup>) -> Result<Self, ConfigError> {
        let mut tools = BTreeMap::new();
        let listing = ToolDescriptor::package_listing();
        tools.insert(listing.name.clone(), listing);

        for group in groups {
            let mut registered = 0;
            for module in group.modules {
                if let Err(reason) = check_module(module.as_ref()) {
                    warn!(
                        "Skipping malformed tool module '{}' in group '{}': {}",
                        module.name(),
                        group.name,
                        reason
                    );
                    continue;
                }

                let descriptor = ToolDescriptor::from_module(&group.name, module);
                if let Some(existing) = tools.get(&descriptor.name) {
                    error!(
                        "Tool '{}' declared by both '{}' and '{}'",
                        descriptor.name, existing.group, group.name
                    );
                    return Err(ConfigError::DuplicateTool {
                        name: descriptor.name,
                        first: existing.group.clone(),
                        second: group.name,
                    });
                }
                tools.insert(descriptor.name.clone(), descriptor);
                registered += 1;
            }
            info!("Registered {} tools from group '{}'", registered, group.name);
        }

        Ok(Self { tools })
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Function-calling view of every registered tool.
    pub fn schemas(&self) -> Vec<serde_json::Value> {
        self.tools
            .values()
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.params.to_json_schema()
                })
            })
            .collect()
    }
}

fn check_module(tool: &dyn Tool) -> Result<(), String> {
    let name = tool.name();
    if name.is_empty() {
        return Err("empty tool name".to_string());
    }
    let snake_case = name.starts_with(|c: char| c.is_ascii_lowercase())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !snake_case {
        return Err("tool name must be snake_case".to_string());
    }
    if tool.description().trim().is_empty() {
        return Err("missing description".to_string());
    }
    tool.params().check_well_formed()
}
