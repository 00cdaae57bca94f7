use now_mcp_tools::*;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn registry() -> ToolRegistry {
    ToolRegistry::discover(builtin_groups()).unwrap()
}

fn catalog() -> PackageCatalog {
    let mut catalog = PackageCatalog::new();
    catalog.define("reporting", ["list_incidents", "get_article", "export_pdf"]);
    catalog.define("service_desk", ["list_incidents", "create_incident", "get_user"]);
    catalog.define("empty", Vec::<String>::new());
    catalog
}

fn selector() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("reporting".to_string()),
        Just("service_desk".to_string()),
        Just("empty".to_string()),
        Just(FULL_PACKAGE.to_string()),
        Just(NONE_PACKAGE.to_string()),
        "[a-z_ ]{0,16}",
    ])
}

proptest! {
    #[test]
    fn test_resolved_set_is_subset_of_registry(selector in selector()) {
        let registry = registry();
        let all: BTreeSet<String> = registry.names().into_iter().collect();

        let exposed = catalog().resolve(selector.as_deref(), &registry);

        prop_assert!(exposed.names().is_subset(&all));
        prop_assert!(exposed.contains(LIST_TOOL_PACKAGES));
    }

    #[test]
    fn test_unknown_selectors_expose_only_introspection(name in "x[a-z_]{0,12}") {
        let exposed = catalog().resolve(Some(&name), &registry());
        prop_assert_eq!(exposed.package(), NONE_PACKAGE);
        prop_assert_eq!(exposed.len(), 1);
    }
}
