//! Agent Tools Module
//!
//! The tools an agent can call to inspect and remediate incidents. Each tool
//! is a short sequence of backend calls whose responses are reshaped into a
//! typed report.

pub mod health;
pub mod logs;
pub mod restart;

use schemars::{schema_for, JsonSchema};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info_span, warn, Instrument};

use crate::{backend::IncidentBackend, metrics, CommanderError, Result};

pub use health::HealthReport;
pub use logs::LogsReport;
pub use restart::RestartReport;

pub const CHECK_HEALTH: &str = "check_health";
pub const QUERY_LOGS: &str = "query_logs";
pub const RESTART_SERVICE: &str = "restart_service";

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CheckHealthArgs {}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct QueryLogsArgs {
    /// Incident to query logs for. Defaults to the current active incident.
    #[serde(default, deserialize_with = "optional_incident_id")]
    #[schemars(with = "Option<i64>")]
    pub incident_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RestartServiceArgs {
    /// Name of the service to restart (currently only 'database' is supported)
    pub service_name: String,
    /// ID of the incident to resolve
    #[serde(deserialize_with = "incident_id")]
    #[schemars(with = "i64")]
    pub incident_id: i64,
}

// Agents often quote numbers, so ids are accepted as integers or as
// strings holding an integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdArgument {
    Number(i64),
    Text(String),
}

impl IdArgument {
    fn into_id<E: de::Error>(self) -> std::result::Result<i64, E> {
        match self {
            IdArgument::Number(id) => Ok(id),
            IdArgument::Text(text) => text.trim().parse().map_err(|_| {
                E::invalid_value(de::Unexpected::Str(&text), &"an integer incident id")
            }),
        }
    }
}

fn incident_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    IdArgument::deserialize(deserializer)?.into_id()
}

fn optional_incident_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    Option::<IdArgument>::deserialize(deserializer)?
        .map(IdArgument::into_id)
        .transpose()
}

/// A validated tool invocation
#[derive(Debug, Clone)]
pub enum ToolCall {
    CheckHealth(CheckHealthArgs),
    QueryLogs(QueryLogsArgs),
    RestartService(RestartServiceArgs),
}

impl ToolCall {
    /// Parse a tool name and its JSON arguments. Missing or `null`
    /// arguments are treated as an empty object.
    pub fn parse(name: &str, arguments: Option<Value>) -> Result<Self> {
        let arguments = match arguments {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(value) => value,
        };

        let invalid = |e: serde_json::Error| {
            CommanderError::Validation(format!("Invalid arguments for {}: {}", name, e))
        };

        match name {
            CHECK_HEALTH => serde_json::from_value(arguments)
                .map(ToolCall::CheckHealth)
                .map_err(invalid),
            QUERY_LOGS => serde_json::from_value(arguments)
                .map(ToolCall::QueryLogs)
                .map_err(invalid),
            RESTART_SERVICE => serde_json::from_value(arguments)
                .map(ToolCall::RestartService)
                .map_err(invalid),
            other => Err(CommanderError::UnknownTool(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::CheckHealth(_) => CHECK_HEALTH,
            ToolCall::QueryLogs(_) => QUERY_LOGS,
            ToolCall::RestartService(_) => RESTART_SERVICE,
        }
    }
}

/// Typed result of one tool invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Health(HealthReport),
    Logs(LogsReport),
    Restart(RestartReport),
}

impl ToolOutput {
    pub fn status(&self) -> &str {
        match self {
            ToolOutput::Health(report) => report.status(),
            ToolOutput::Logs(report) => report.status(),
            ToolOutput::Restart(report) => report.status(),
        }
    }
}

/// Tool description advertised to the agent runtime
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

fn input_schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| serde_json::json!({ "type": "object" }))
}

/// Dispatcher mapping tool invocations onto the incident backend
#[derive(Clone)]
pub struct IncidentTools {
    backend: Arc<dyn IncidentBackend>,
}

impl IncidentTools {
    pub fn new(backend: Arc<dyn IncidentBackend>) -> Self {
        Self { backend }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: CHECK_HEALTH,
                description: "Check the current health status of the Incident Commander system. \
                              Returns system status and active incident details if any.",
                input_schema: input_schema::<CheckHealthArgs>(),
            },
            ToolDefinition {
                name: QUERY_LOGS,
                description: "Query recent incident logs from the system. If no incident_id \
                              is provided, uses the current active incident. Returns logs and \
                              incident information.",
                input_schema: input_schema::<QueryLogsArgs>(),
            },
            ToolDefinition {
                name: RESTART_SERVICE,
                description: "Restart a service to remediate incidents (currently only \
                              'database' is supported). Resolves the given incident and \
                              returns resolution status and details.",
                input_schema: input_schema::<RestartServiceArgs>(),
            },
        ]
    }

    pub async fn check_health(&self) -> Result<HealthReport> {
        health::check_health(self.backend.as_ref()).await
    }

    pub async fn query_logs(&self, incident_id: Option<i64>) -> Result<LogsReport> {
        logs::query_logs(self.backend.as_ref(), incident_id).await
    }

    pub async fn restart_service(&self, service_name: &str, incident_id: i64) -> Result<RestartReport> {
        restart::restart_service(self.backend.as_ref(), service_name, incident_id).await
    }

    pub async fn dispatch(&self, call: ToolCall) -> Result<ToolOutput> {
        let tool = call.name();
        let span = info_span!("tool_call", tool);

        let result = async {
            match call {
                ToolCall::CheckHealth(_) => self.check_health().await.map(ToolOutput::Health),
                ToolCall::QueryLogs(args) => {
                    self.query_logs(args.incident_id).await.map(ToolOutput::Logs)
                }
                ToolCall::RestartService(args) => self
                    .restart_service(&args.service_name, args.incident_id)
                    .await
                    .map(ToolOutput::Restart),
            }
        }
        .instrument(span)
        .await;

        if let Err(e) = &result {
            warn!(tool, "Tool call failed: {}", e);
        }
        metrics::record_tool_call(tool, result.is_ok());
        result
    }
}
