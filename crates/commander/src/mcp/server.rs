use serde_json::{json, Value};
use tracing::{debug, error};

use super::protocol::{
    CallToolParams, CallToolResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
};
use crate::{
    tools::{IncidentTools, ToolCall},
    CommanderError,
};

pub const SERVER_NAME: &str = "Incident Commander";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Transport-independent MCP request handler
#[derive(Clone)]
pub struct McpServer {
    tools: IncidentTools,
}

impl McpServer {
    pub fn new(tools: IncidentTools) -> Self {
        Self { tools }
    }

    /// Handle one raw JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => Some(JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::parse_error(e),
            )),
        }
    }

    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        if value.is_array() {
            return Some(JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::invalid_request("Batch requests are not supported"),
            ));
        }

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ))
            }
        };

        if let Err(e) = request.validate() {
            return Some(JsonRpcResponse::error(id, e));
        }

        if request.is_notification() {
            debug!(method = %request.method, "Received notification");
            return None;
        }

        debug!(method = %request.method, "Handling request");
        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.tools_list()),
            "tools/call" => self.tools_call(request.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    fn tools_list(&self) -> Value {
        json!({ "tools": self.tools.definitions() })
    }

    async fn tools_call(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e)))?;

        let call = ToolCall::parse(&params.name, params.arguments).map_err(|e| match e {
            CommanderError::UnknownTool(name) => {
                JsonRpcError::invalid_params(format!("Unknown tool: {}", name))
            }
            other => JsonRpcError::invalid_params(other.to_string()),
        })?;

        let result = match self.tools.dispatch(call).await {
            Ok(output) => match serde_json::to_value(&output) {
                Ok(value) => CallToolResult::success(value),
                Err(e) => CallToolResult::failure(e.to_string()),
            },
            Err(e) => {
                error!(tool = %params.name, "Error executing tool: {}", e);
                CallToolResult::failure(format!("Error executing tool {}: {}", params.name, e))
            }
        };

        serde_json::to_value(result)
            .map_err(|e| JsonRpcError::new(super::protocol::error_codes::INTERNAL_ERROR, e.to_string()))
    }
}
