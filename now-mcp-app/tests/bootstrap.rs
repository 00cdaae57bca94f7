//! Startup wiring tests.

#![allow(clippy::unwrap_used)]

use now_mcp_app::bootstrap::{build_dispatcher, build_with_groups};
use now_mcp_core::{AuthConfig, ConfigError, ServerConfig};
use now_mcp_tools::{builtin_groups, ErrorKind, ToolGroup, ToolRegistry, LIST_TOOL_PACKAGES};
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn config(package: Option<&str>, package_config_path: PathBuf) -> ServerConfig {
    ServerConfig {
        instance_url: "http://127.0.0.1:9".into(),
        auth: AuthConfig::Basic {
            username: "admin".into(),
            password: "pw".into(),
        },
        timeout_secs: 5,
        debug: false,
        tool_package: package.map(str::to_string),
        package_config_path,
    }
}

fn packages_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"reporting:\n  - list_incidents\n  - get_article\n")
        .unwrap();
    file
}

#[tokio::test]
async fn test_reporting_package_end_to_end() {
    let file = packages_file();
    let dispatcher =
        build_dispatcher(config(Some("reporting"), file.path().to_path_buf())).unwrap();

    let names: Vec<String> = dispatcher.list_tools().into_iter().map(|t| t.name).collect();
    assert_eq!(names, ["get_article", "list_incidents", LIST_TOOL_PACKAGES]);

    let result = dispatcher
        .invoke("create_incident", json!({"values": {"short_description": "x"}}))
        .await;
    assert_eq!(result.error, Some(ErrorKind::ToolNotFound));
}

#[test]
fn test_missing_package_file_still_starts() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = build_dispatcher(config(None, dir.path().join("missing.yaml"))).unwrap();

    let registry = ToolRegistry::discover(builtin_groups()).unwrap();
    assert_eq!(dispatcher.list_tools().len(), registry.len());
    assert_eq!(dispatcher.exposed().package(), "full");
}

#[test]
fn test_empty_basic_credentials_fail_startup() {
    let file = packages_file();
    let mut config = config(None, file.path().to_path_buf());
    config.auth = AuthConfig::Basic {
        username: String::new(),
        password: String::new(),
    };

    assert!(matches!(
        build_dispatcher(config),
        Err(ConfigError::Credential(_))
    ));
}

#[test]
fn test_duplicate_tools_fail_startup() {
    let file = packages_file();
    let mut groups = builtin_groups();
    groups.extend(builtin_groups().into_iter().take(1));
    let result = build_with_groups(config(None, file.path().to_path_buf()), groups);
    assert!(matches!(result, Err(ConfigError::DuplicateTool { .. })));
}

#[test]
fn test_malformed_package_file_fails_startup() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"reporting: {list_incidents: [\n").unwrap();

    let result = build_with_groups(
        config(Some("reporting"), file.path().to_path_buf()),
        Vec::<ToolGroup>::new(),
    );
    assert!(matches!(result, Err(ConfigError::Yaml { .. })));
}
