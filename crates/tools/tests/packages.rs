#[cfg(test)]
mod packages_tests {
    use now_mcp_core::ConfigError;
    use now_mcp_tools::*;
    use std::collections::BTreeSet;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn registry() -> ToolRegistry {
        ToolRegistry::discover(builtin_groups()).unwrap()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn yaml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_unset_and_empty_select_full() {
        let registry = registry();
        let catalog = PackageCatalog::new();
        let all: BTreeSet<String> = registry.names().into_iter().collect();

        for selector in [None, Some(""), Some("   "), Some(FULL_PACKAGE)] {
            let exposed = catalog.resolve(selector, &registry);
            assert_eq!(exposed.package(), FULL_PACKAGE);
            assert_eq!(exposed.names(), &all);
        }
    }

    #[test]
    fn test_none_exposes_only_introspection() {
        let exposed = PackageCatalog::new().resolve(Some(NONE_PACKAGE), &registry());
        assert_eq!(exposed.names(), &set(&[LIST_TOOL_PACKAGES]));
    }

    #[test]
    fn test_defined_package_intersects_registry() {
        let mut catalog = PackageCatalog::new();
        catalog.define("reporting", ["list_incidents", "get_article", "export_pdf"]);

        let exposed = catalog.resolve(Some("reporting"), &registry());

        assert_eq!(exposed.package(), "reporting");
        assert_eq!(exposed.requested(), Some("reporting"));
        assert_eq!(
            exposed.names(),
            &set(&["get_article", "list_incidents", LIST_TOOL_PACKAGES])
        );
        assert!(!exposed.contains("export_pdf"));
        assert!(!exposed.contains("create_incident"));
    }

    #[test]
    fn test_unknown_package_falls_back_to_none() {
        let mut catalog = PackageCatalog::new();
        catalog.define("reporting", ["list_incidents"]);

        let exposed = catalog.resolve(Some("auditor"), &registry());

        assert_eq!(exposed.package(), NONE_PACKAGE);
        assert_eq!(exposed.requested(), Some("auditor"));
        assert_eq!(exposed.names(), &set(&[LIST_TOOL_PACKAGES]));
    }

    #[test]
    fn test_load_from_yaml_file() {
        let file = yaml_file(
            "service_desk:\n  - list_incidents\n  - get_incident\n  - update_incident\nreporting:\n  - list_incidents\n",
        );

        let catalog = PackageCatalog::load(file.path()).unwrap();

        assert_eq!(
            catalog.names(),
            ["full", "none", "reporting", "service_desk"]
        );
        let exposed = catalog.resolve(Some("service_desk"), &registry());
        assert_eq!(exposed.len(), 4);
    }

    #[test]
    fn test_missing_file_is_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = PackageCatalog::load(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(catalog.names(), ["full", "none"]);
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let file = yaml_file("reporting: [list_incidents\n");
        assert!(matches!(
            PackageCatalog::load(file.path()),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn test_reserved_names_cannot_be_redefined() {
        let file = yaml_file("none:\n  - create_incident\nfull:\n  - get_user\n");
        let catalog = PackageCatalog::load(file.path()).unwrap();
        let registry = registry();

        let none = catalog.resolve(Some(NONE_PACKAGE), &registry);
        assert_eq!(none.names(), &set(&[LIST_TOOL_PACKAGES]));
        let full = catalog.resolve(Some(FULL_PACKAGE), &registry);
        assert_eq!(full.len(), registry.len());
    }
}
