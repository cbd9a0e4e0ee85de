//! MCP Server
//!
//! Dispatches JSON-RPC `initialize`, `tools/list`, and `tools/call` requests
//! against a shared [`VestigeEngine`]. One `McpServer` lives for the whole
//! stdio session; `tools/call` is rejected until `initialize` has completed.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use vestige_core::SystemClock;
use vestige_core::VestigeEngine;

use crate::protocol::messages::{
    CallToolRequest, CallToolResult, InitializeRequest, InitializeResult, ListToolsResult,
    ToolDescription,
};
use crate::protocol::types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::tools;

const SERVER_NAME: &str = "vestige-mcp";

pub struct McpServer {
    engine: Arc<VestigeEngine<SystemClock>>,
    initialized: bool,
}

impl McpServer {
    pub fn new(engine: Arc<VestigeEngine<SystemClock>>) -> Self {
        Self {
            engine,
            initialized: false,
        }
    }

    /// Dispatch a single JSON-RPC request. Returns `None` for notifications
    /// (requests with no `id`), which per the JSON-RPC spec get no reply.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        let is_notification = id.is_none();

        debug!(method = %request.method, "handling request");

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params),
            "notifications/initialized" => Ok(Value::Null),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params),
            "ping" => Ok(serde_json::json!({})),
            other => {
                warn!(method = %other, "unknown method");
                Err(JsonRpcError::method_not_found_with_message(&format!(
                    "Unknown method: {}",
                    other
                )))
            }
        };

        if is_notification {
            return None;
        }

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, e),
        })
    }

    fn handle_initialize(&mut self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        if let Some(params) = params {
            let _req: InitializeRequest = serde_json::from_value(params)
                .map_err(|e| JsonRpcError::invalid_params(&e.to_string()))?;
        }
        self.initialized = true;
        let result = InitializeResult::new(SERVER_NAME, env!("CARGO_PKG_VERSION"));
        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(&e.to_string()))
    }

    fn handle_tools_list(&self) -> Result<Value, JsonRpcError> {
        let tools = vec![
            ToolDescription {
                name: "ingest".to_string(),
                description: "Remember a new fact or piece of knowledge".to_string(),
                input_schema: tools::ingest::schema(),
            },
            ToolDescription {
                name: "review".to_string(),
                description: "Mark a memory as reviewed, updating its FSRS-6 schedule"
                    .to_string(),
                input_schema: tools::review::schema(),
            },
            ToolDescription {
                name: "search".to_string(),
                description: "Recall memories by keyword, semantic similarity, or both"
                    .to_string(),
                input_schema: tools::search::schema(),
            },
        ];
        serde_json::to_value(ListToolsResult { tools })
            .map_err(|e| JsonRpcError::internal_error(&e.to_string()))
    }

    fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        if !self.initialized {
            return Err(JsonRpcError::server_not_initialized());
        }

        let params = params.ok_or_else(|| JsonRpcError::invalid_params("missing params"))?;
        let req: CallToolRequest = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::invalid_params(&e.to_string()))?;

        let outcome = match req.name.as_str() {
            "ingest" => tools::ingest::execute(&self.engine, req.arguments),
            "review" => tools::review::execute(&self.engine, req.arguments),
            "search" => tools::search::execute(&self.engine, req.arguments),
            other => {
                return Err(JsonRpcError::method_not_found_with_message(&format!(
                    "Unknown tool: {}",
                    other
                )));
            }
        };

        let call_result = match outcome {
            Ok(value) => CallToolResult::ok(&value),
            Err(message) => CallToolResult::error(message),
        };
        serde_json::to_value(call_result).map_err(|e| JsonRpcError::internal_error(&e.to_string()))
    }
}
