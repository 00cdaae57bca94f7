#[cfg(test)]
mod registry_tests {
    use async_trait::async_trait;
    use now_mcp_auth::{AuthManager, BasicCredential, Credential};
    use now_mcp_core::{AuthConfig, ConfigError, ServerConfig};
    use now_mcp_tools::*;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct NamedTool {
        name: &'static str,
        description: &'static str,
        params: ParamSchema,
    }

    impl NamedTool {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                description: "mock tool",
                params: ParamSchema::new(),
            }
        }
    }

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            self.description
        }

        fn params(&self) -> ParamSchema {
            self.params.clone()
        }

        async fn execute(&self, _ctx: ToolContext, _args: Value) -> ToolResult {
            ToolResult::ok(format!("ran {}", self.name), json!({"tool": self.name}))
        }
    }

    fn context() -> ToolContext {
        let config = ServerConfig {
            instance_url: "http://127.0.0.1:9".into(),
            auth: AuthConfig::Basic {
                username: "admin".into(),
                password: "pw".into(),
            },
            timeout_secs: 5,
            debug: false,
            tool_package: None,
            package_config_path: "unused.yaml".into(),
        };
        let auth = AuthManager::new(Credential::Basic(
            BasicCredential::new("admin", "pw").unwrap(),
        ));
        ToolContext::new(Arc::new(config), Arc::new(auth)).unwrap()
    }

    #[test]
    fn test_builtin_groups_register_every_tool() {
        let registry = ToolRegistry::discover(builtin_groups()).unwrap();

        assert_eq!(registry.len(), 16);
        for name in [
            "list_incidents",
            "get_incident",
            "create_incident",
            "update_incident",
            "get_article",
            "delete_change_request",
            "list_users",
            LIST_TOOL_PACKAGES,
        ] {
            assert!(registry.contains(name), "missing {}", name);
        }
        assert_eq!(registry.get("get_article").unwrap().group, "knowledge");
    }

    #[test]
    fn test_duplicate_across_groups_is_fatal() {
        let groups = vec![
            ToolGroup::new("alpha").with(Arc::new(NamedTool::new("get_thing"))),
            ToolGroup::new("beta").with(Arc::new(NamedTool::new("get_thing"))),
        ];

        match ToolRegistry::discover(groups) {
            Err(ConfigError::DuplicateTool {
                name,
                first,
                second,
            }) => {
                assert_eq!(name, "get_thing");
                assert_eq!(first, "alpha");
                assert_eq!(second, "beta");
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("duplicate registration accepted"),
        }
    }

    #[test]
    fn test_duplicate_with_builtin_is_fatal() {
        let mut groups = builtin_groups();
        groups.push(ToolGroup::new("extra").with(Arc::new(NamedTool::new("list_incidents"))));
        assert!(matches!(
            ToolRegistry::discover(groups),
            Err(ConfigError::DuplicateTool { .. })
        ));
    }

    #[test]
    fn test_malformed_modules_are_skipped() {
        let mut undocumented = NamedTool::new("no_description");
        undocumented.description = "  ";
        let mut repeated = NamedTool::new("repeated_param");
        repeated.params = ParamSchema::new()
            .required("sys_id", ParamType::String, "id")
            .optional("sys_id", ParamType::String, "id again");

        let group = ToolGroup::new("mixed")
            .with(Arc::new(NamedTool::new("BadName")))
            .with(Arc::new(undocumented))
            .with(Arc::new(repeated))
            .with(Arc::new(NamedTool::new("good_tool")));
        let registry = ToolRegistry::discover(vec![group]).unwrap();

        assert_eq!(registry.names(), ["good_tool", LIST_TOOL_PACKAGES]);
    }

    #[test]
    fn test_schemas_listing() {
        let registry = ToolRegistry::discover(builtin_groups()).unwrap();
        let schemas = registry.schemas();
        let get_incident = schemas
            .iter()
            .find(|s| s["name"] == "get_incident")
            .unwrap();
        assert_eq!(get_incident["inputSchema"]["required"], json!(["sys_id"]));
    }

    #[tokio::test]
    async fn test_distinct_registrations_both_invocable() {
        let registry = ToolRegistry::discover(vec![
            ToolGroup::new("alpha").with(Arc::new(NamedTool::new("first_tool"))),
            ToolGroup::new("beta").with(Arc::new(NamedTool::new("second_tool"))),
        ])
        .unwrap();
        let registry = Arc::new(registry);
        let catalog = Arc::new(PackageCatalog::new());
        let exposed = Arc::new(catalog.resolve(None, &registry));
        let dispatcher = Dispatcher::new(registry, catalog, exposed, context());

        for name in ["first_tool", "second_tool"] {
            let result = dispatcher.invoke(name, json!({})).await;
            assert!(result.success, "{} failed: {}", name, result.message);
            assert_eq!(result.data.unwrap()["tool"], name);
        }
    }
}
