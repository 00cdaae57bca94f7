//! Statically enumerated tool groups shipped with the bridge.

use crate::registry::ToolGroup;
use crate::table::{TableOperation, TableTool};
use std::sync::Arc;

struct TableToolDef {
    name: &'static str,
    description: &'static str,
    operation: TableOperation,
}

const fn table_tool(
    name: &'static str,
    operation: TableOperation,
    description: &'static str,
) -> TableToolDef {
    TableToolDef {
        name,
        description,
        operation,
    }
}

const INCIDENT_TOOLS: &[TableToolDef] = &[
    table_tool(
        "list_incidents",
        TableOperation::List,
        "List incidents, optionally filtered by an encoded query",
    ),
    table_tool("get_incident", TableOperation::Get, "Get one incident by sys_id"),
    table_tool("create_incident", TableOperation::Create, "Create a new incident"),
    table_tool("update_incident", TableOperation::Update, "Update fields of an existing incident"),
];

const KNOWLEDGE_TOOLS: &[TableToolDef] = &[
    table_tool(
        "list_articles",
        TableOperation::List,
        "List knowledge base articles, optionally filtered by an encoded query",
    ),
    table_tool("get_article", TableOperation::Get, "Get one knowledge article by sys_id"),
    table_tool("create_article", TableOperation::Create, "Create a knowledge article"),
    table_tool("update_article", TableOperation::Update, "Update a knowledge article"),
];

const CHANGE_TOOLS: &[TableToolDef] = &[
    table_tool(
        "list_change_requests",
        TableOperation::List,
        "List change requests, optionally filtered by an encoded query",
    ),
    table_tool("get_change_request", TableOperation::Get, "Get one change request by sys_id"),
    table_tool("create_change_request", TableOperation::Create, "Create a change request"),
    table_tool("update_change_request", TableOperation::Update, "Update a change request"),
    table_tool("delete_change_request", TableOperation::Delete, "Delete a change request"),
];

const USER_TOOLS: &[TableToolDef] = &[
    table_tool(
        "list_users",
        TableOperation::List,
        "List users, optionally filtered by an encoded query",
    ),
    table_tool("get_user", TableOperation::Get, "Get one user by sys_id"),
];

fn table_group(group: &str, table: &str, defs: &[TableToolDef]) -> ToolGroup {
    defs.iter().fold(ToolGroup::new(group), |group, def| {
        group.with(Arc::new(TableTool::new(
            def.name,
            def.description,
            table,
            def.operation,
        )))
    })
}

/// Every group compiled into the binary, in registration order.
pub fn builtin_groups() -> Vec<ToolGroup> {
    vec![
        table_group("incident", "incident", INCIDENT_TOOLS),
        table_group("knowledge", "kb_knowledge", KNOWLEDGE_TOOLS),
        table_group("change", "change_request", CHANGE_TOOLS),
        table_group("user", "sys_user", USER_TOOLS),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_group_sizes() {
        let sizes: Vec<(String, usize)> = builtin_groups()
            .iter()
            .map(|g| (g.name().to_string(), g.len()))
            .collect();
        assert_eq!(
            sizes,
            vec![
                ("incident".to_string(), 4),
                ("knowledge".to_string(), 4),
                ("change".to_string(), 5),
                ("user".to_string(), 2),
            ]
        );
    }
}
