//! Stdio request loop tests, driven over in-memory buffers.

#![allow(clippy::unwrap_used)]

use now_mcp_app::bootstrap::build_dispatcher;
use now_mcp_app::commands::serve::{handle_line, serve};
use now_mcp_core::{AuthConfig, ServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(instance_url: String) -> ServerConfig {
    ServerConfig {
        instance_url,
        auth: AuthConfig::Basic {
            username: "admin".into(),
            password: "pw".into(),
        },
        timeout_secs: 5,
        debug: false,
        tool_package: None,
        package_config_path: "does/not/exist.yaml".into(),
    }
}

fn parse_lines(output: &[u8]) -> Vec<Value> {
    String::from_utf8(output.to_vec())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_tools_request() {
    let dispatcher = build_dispatcher(config("http://127.0.0.1:9".into())).unwrap();

    let response = handle_line(&dispatcher, r#"{"id": 7, "method": "list_tools"}"#).await;

    assert_eq!(response["id"], 7);
    let tools = response["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 16);
    assert!(tools.iter().any(|t| t["name"] == "get_incident"));
}

#[tokio::test]
async fn test_malformed_request() {
    let dispatcher = build_dispatcher(config("http://127.0.0.1:9".into())).unwrap();

    let response = handle_line(&dispatcher, r#"{"method": "shutdown"}"#).await;
    assert!(response["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid request"));

    let response = handle_line(&dispatcher, "not json").await;
    assert!(response["error"].is_string());
}

#[tokio::test]
async fn test_serve_answers_every_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/incident/i1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"sys_id": "i1", "number": "INC0010001"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = Arc::new(build_dispatcher(config(server.uri())).unwrap());
    let input = concat!(
        r#"{"id": 1, "method": "call_tool", "name": "get_incident", "arguments": {"sys_id": "i1"}}"#,
        "\n",
        "\n",
        r#"{"id": 2, "method": "call_tool", "name": "get_incident"}"#,
        "\n",
        r#"{"id": 3, "method": "list_tools"}"#,
        "\n",
    );
    let mut output = Vec::new();

    serve(dispatcher, input.as_bytes(), &mut output).await.unwrap();

    let mut responses = parse_lines(&output);
    responses.sort_by_key(|r| r["id"].as_i64());
    assert_eq!(responses.len(), 3);

    assert_eq!(responses[0]["result"]["success"], true);
    assert_eq!(responses[0]["result"]["data"]["number"], "INC0010001");

    assert_eq!(responses[1]["result"]["success"], false);
    assert_eq!(responses[1]["result"]["error"], "validation");

    assert!(responses[2]["tools"].is_array());
}

#[tokio::test]
async fn test_undecodable_line_does_not_stop_serving() {
    let dispatcher = Arc::new(build_dispatcher(config("http://127.0.0.1:9".into())).unwrap());
    let mut input = Vec::new();
    input.extend_from_slice(b"{\"id\": 1, \"method\": \"list_tools\"}\n");
    input.extend_from_slice(b"\xff\xfe\n");
    input.extend_from_slice(b"{\"id\": 2, \"method\": \"list_tools\"}");
    let mut output = Vec::new();

    serve(dispatcher, input.as_slice(), &mut output).await.unwrap();

    let mut responses = parse_lines(&output);
    responses.sort_by_key(|r| r["id"].as_i64());
    assert_eq!(responses.len(), 3);

    assert!(responses[0]["id"].is_null());
    assert!(responses[0]["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid request"));
    assert_eq!(responses[1]["id"], 1);
    assert!(responses[1]["tools"].is_array());
    assert_eq!(responses[2]["id"], 2);
    assert!(responses[2]["tools"].is_array());
}
