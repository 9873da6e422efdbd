mod common;

use axum::http::StatusCode;
use common::{backend_router, spawn, FakeBackend, RecordedCall};
use incident_commander::{
    backend::BackendClient,
    config::BackendConfig,
    mcp::{build_router, McpServer},
    tools::IncidentTools,
};
use serde_json::{json, Value};
use std::sync::Arc;

async fn commander_for(fake: Arc<FakeBackend>) -> axum_test::TestServer {
    let base_url = spawn(backend_router(fake)).await;
    let client = BackendClient::new(&BackendConfig {
        base_url,
        timeout_secs: 10,
    })
    .expect("Failed to build backend client");
    let server = McpServer::new(IncidentTools::new(Arc::new(client)));
    axum_test::TestServer::new(build_router(server)).unwrap()
}

async fn call_tool(server: &axum_test::TestServer, name: &str, arguments: Value) -> Value {
    let response = server
        .post("/mcp")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    body["result"].clone()
}

#[tokio::test]
async fn test_health_and_metrics_endpoints() {
    let server = commander_for(FakeBackend::healthy()).await;

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");

    call_tool(&server, "check_health", json!({})).await;
    let response = server.get("/metrics").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("incident_commander_tool_calls_total"));
}

#[tokio::test]
async fn test_lists_three_tools() {
    let server = commander_for(FakeBackend::healthy()).await;
    let response = server
        .post("/mcp")
        .json(&json!({ "jsonrpc": "2.0", "id": "list", "method": "tools/list" }))
        .await;
    let body: Value = response.json();
    let names: Vec<&str> = body["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["check_health", "query_logs", "restart_service"]);
}

#[tokio::test]
async fn test_notification_over_http_is_accepted() {
    let server = commander_for(FakeBackend::healthy()).await;
    let response = server
        .post("/mcp")
        .json(&json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_check_health_echoes_backend_envelope() {
    let server = commander_for(FakeBackend::healthy()).await;
    let result = call_tool(&server, "check_health", json!({})).await;
    assert_eq!(result["isError"], false);
    let report = &result["structuredContent"];
    assert_eq!(report["status"], "Healthy");
    assert_eq!(report["details"], json!({ "Status": "Healthy", "Incident": null }));

    let server = commander_for(FakeBackend::with_open_incident(7, false)).await;
    let result = call_tool(&server, "check_health", json!({})).await;
    let report = &result["structuredContent"];
    assert_eq!(report["status"], "Unhealthy - Open");
    assert_eq!(report["incident_id"], 7);
    assert_eq!(report["created_at"], "2026-10-14T08:00:00Z");
}

#[tokio::test]
async fn test_numeric_incident_status_is_reported_verbatim() {
    let incident = json!({
        "Id": 5,
        "Status": 1,
        "CreatedAt": "2026-10-14T08:00:00.1234567",
        "ResolvedAt": null,
        "ResolvedBy": null,
        "Severity": "P1"
    });
    let fake = FakeBackend::with_incident(incident.clone()).with_logs(vec![
        json!({ "Id": 1, "Timestamp": "2026-10-14T08:00:01", "Level": "Critical", "Message": "disk", "Source": "db" }),
    ]);
    let server = commander_for(fake).await;

    let result = call_tool(&server, "check_health", json!({})).await;
    assert_eq!(result["isError"], false);
    let report = &result["structuredContent"];
    assert_eq!(report["status"], "Unhealthy - 1");
    assert_eq!(report["details"]["Incident"], incident);

    let result = call_tool(&server, "query_logs", json!({})).await;
    let report = &result["structuredContent"];
    assert_eq!(report["incident_id"], 5);
    assert_eq!(report["logs"][0]["Level"], "Critical");
    assert_eq!(report["logs"][0]["Source"], "db");
}

#[tokio::test]
async fn test_query_logs_without_incident_skips_logs_endpoint() {
    let fake = FakeBackend::healthy();
    let server = commander_for(fake.clone()).await;

    let result = call_tool(&server, "query_logs", json!({})).await;
    assert_eq!(result["structuredContent"]["status"], "No active incident");
    assert_eq!(result["structuredContent"]["logs"], json!([]));

    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "/api/incidents/current");
}

#[tokio::test]
async fn test_query_logs_counts_backend_entries() {
    let fake = FakeBackend::healthy().with_logs(vec![
        json!({ "Id": 2, "Timestamp": "2026-10-14T09:01:00Z", "Level": "Error", "Message": "Connection refused" }),
        json!({ "Id": 1, "Timestamp": "2026-10-14T09:00:00Z", "Level": "Warning", "Message": "Slow query" }),
    ]);
    let server = commander_for(fake.clone()).await;

    let result = call_tool(&server, "query_logs", json!({ "incident_id": 42 })).await;
    let report = &result["structuredContent"];
    assert_eq!(report["status"], "Success");
    assert_eq!(report["incident_id"], 42);
    assert_eq!(report["log_count"], 2);
    assert_eq!(report["logs"][0]["Message"], "Connection refused");
    assert_eq!(report["logs"][1]["Level"], "Warning");
    assert_eq!(fake.calls().len(), 1);
}

#[tokio::test]
async fn test_restart_database_end_to_end() {
    let fake = FakeBackend::with_open_incident(7, false);
    let server = commander_for(fake.clone()).await;

    let result = call_tool(
        &server,
        "restart_service",
        json!({ "service_name": "database", "incident_id": 7 }),
    )
    .await;
    let report = &result["structuredContent"];
    assert_eq!(report["status"], "Success");
    assert_eq!(report["resolved_by"], "AI Agent");
    assert_eq!(report["resolved_at"], "2026-10-14T10:00:05Z");
    assert_eq!(report["message"], "database service restarted. Incident 7 resolved.");

    assert_eq!(
        fake.calls(),
        vec![
            RecordedCall {
                method: "POST",
                path: "/api/incidents/7/logs".to_string(),
                body: Some(json!({ "level": 0, "message": "AI Agent initiated database service restart" })),
            },
            RecordedCall {
                method: "PATCH",
                path: "/api/incidents/7/resolve".to_string(),
                body: Some(json!({ "resolvedBy": "AI Agent" })),
            },
            RecordedCall {
                method: "POST",
                path: "/api/incidents/7/logs".to_string(),
                body: Some(json!({
                    "level": 0,
                    "message": "database service restarted successfully. Incident resolved."
                })),
            },
        ]
    );

    let result = call_tool(&server, "check_health", json!({})).await;
    assert_eq!(result["structuredContent"]["status"], "Healthy");
}

#[tokio::test]
async fn test_restart_unknown_service_touches_nothing() {
    let fake = FakeBackend::with_open_incident(7, false);
    let server = commander_for(fake.clone()).await;

    let result = call_tool(
        &server,
        "restart_service",
        json!({ "service_name": "cache", "incident_id": 7 }),
    )
    .await;
    assert_eq!(result["isError"], false);
    assert_eq!(result["structuredContent"]["status"], "Error");
    assert_eq!(
        result["structuredContent"]["message"],
        "Unknown service: cache. Only 'database' is supported."
    );
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_failed_resolution_leaves_single_log_entry() {
    let fake = FakeBackend::with_open_incident(7, true);
    let server = commander_for(fake.clone()).await;

    let result = call_tool(
        &server,
        "restart_service",
        json!({ "service_name": "Database", "incident_id": 7 }),
    )
    .await;
    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("HTTP 500"), "unexpected error text: {}", text);
    assert!(text.contains("database on fire"));

    let calls = fake.calls();
    let log_writes = calls.iter().filter(|c| c.method == "POST").count();
    assert_eq!(log_writes, 1);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].method, "PATCH");
}

#[tokio::test]
async fn test_invalid_arguments_are_rejected_before_backend() {
    let fake = FakeBackend::with_open_incident(7, false);
    let server = commander_for(fake.clone()).await;

    let response = server
        .post("/mcp")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": { "name": "restart_service", "arguments": { "service_name": "database" } }
        }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], -32602);
    assert!(fake.calls().is_empty());
}
