#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// A request the fake backend received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// In-process stand-in for the incident REST backend
#[derive(Default)]
pub struct FakeBackend {
    pub incident: Mutex<Option<Value>>,
    pub logs: Mutex<Vec<Value>>,
    pub calls: Mutex<Vec<RecordedCall>>,
    pub fail_resolve: bool,
}

impl FakeBackend {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_open_incident(id: i64, fail_resolve: bool) -> Arc<Self> {
        Arc::new(Self {
            incident: Mutex::new(Some(json!({
                "Id": id,
                "Status": "Open",
                "CreatedAt": "2026-10-14T08:00:00Z",
                "ResolvedAt": null,
                "ResolvedBy": null
            }))),
            fail_resolve,
            ..Self::default()
        })
    }

    /// Serve `incident` as the active incident, exactly as given.
    pub fn with_incident(incident: Value) -> Arc<Self> {
        Arc::new(Self {
            incident: Mutex::new(Some(incident)),
            ..Self::default()
        })
    }

    pub fn with_logs(self: Arc<Self>, logs: Vec<Value>) -> Arc<Self> {
        *self.logs.lock().unwrap() = logs;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, path: String, body: Option<Value>) {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall { method, path, body });
    }
}

async fn current(State(fake): State<Arc<FakeBackend>>) -> Json<Value> {
    fake.record("GET", "/api/incidents/current".to_string(), None);
    let incident = fake.incident.lock().unwrap().clone();
    Json(match incident {
        Some(incident) => {
            let name = match &incident["Status"] {
                Value::String(name) => name.clone(),
                other => other.to_string(),
            };
            json!({ "Status": name, "Incident": incident })
        }
        None => json!({ "Status": "Healthy", "Incident": null }),
    })
}

async fn logs(State(fake): State<Arc<FakeBackend>>, Path(id): Path<i64>) -> Json<Value> {
    fake.record("GET", format!("/api/incidents/{}/logs", id), None);
    Json(Value::Array(fake.logs.lock().unwrap().clone()))
}

async fn add_log(
    State(fake): State<Arc<FakeBackend>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    fake.record("POST", format!("/api/incidents/{}/logs", id), Some(body.clone()));
    let level = match body["level"].as_u64() {
        Some(1) => "Warning",
        Some(2) => "Error",
        _ => "Info",
    };
    let mut logs = fake.logs.lock().unwrap();
    let entry = json!({
        "Id": logs.len() + 1,
        "Timestamp": "2026-10-14T10:00:00Z",
        "Level": level,
        "Message": body["message"].clone()
    });
    logs.push(entry.clone());
    Json(entry)
}

async fn resolve(
    State(fake): State<Arc<FakeBackend>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    fake.record("PATCH", format!("/api/incidents/{}/resolve", id), Some(body.clone()));
    if fake.fail_resolve {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database on fire").into_response();
    }
    *fake.incident.lock().unwrap() = None;
    Json(json!({
        "Id": id,
        "ResolvedAt": "2026-10-14T10:00:05Z",
        "ResolvedBy": body["resolvedBy"].clone()
    }))
    .into_response()
}

pub fn backend_router(fake: Arc<FakeBackend>) -> Router {
    Router::new()
        .route("/api/incidents/current", get(current))
        .route("/api/incidents/{id}/logs", get(logs).post(add_log))
        .route("/api/incidents/{id}/resolve", patch(resolve))
        .with_state(fake)
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
