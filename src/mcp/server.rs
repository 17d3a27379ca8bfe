//! MCP server implementation.

use super::dispatcher::ToolDispatcher;
use super::protocol::*;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "gemini-video";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server exposing the video analysis tools.
pub struct McpServer {
    dispatcher: Arc<ToolDispatcher>,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Run the MCP server (reads from stdin, writes to stdout).
    ///
    /// Each request runs on its own task so a long analysis doesn't block
    /// `tools/list` or other calls. Responses go through a single writer.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(response) = rx.recv().await {
                let line = match serde_json::to_string(&response) {
                    Ok(line) => line,
                    Err(e) => {
                        error!("Failed to serialize response: {}", e);
                        continue;
                    }
                };
                stdout.write_all(line.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        info!("Gemini video MCP server listening on stdio");

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(line) {
                Ok(req) => req,
                Err(e) => {
                    warn!("Failed to parse request: {}", e);
                    let _ = tx.send(JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"));
                    continue;
                }
            };

            let dispatcher = Arc::clone(&self.dispatcher);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = handle_request(&dispatcher, request).await {
                    let _ = tx.send(response);
                }
            });
        }

        debug!("stdin closed; waiting for in-flight requests");
        drop(tx);
        writer.await??;
        Ok(())
    }
}

fn to_value<T: Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, &e.to_string()),
    }
}

/// Handle a single JSON-RPC request. Notifications get no response.
async fn handle_request(
    dispatcher: &ToolDispatcher,
    request: JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    if request.is_notification() {
        debug!("Notification: {}", request.method);
        return None;
    }

    let response = match request.method.as_str() {
        "initialize" => handle_initialize(request.id, request.params),
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => to_value(
            request.id,
            &ToolsListResult {
                tools: dispatcher.tools(),
            },
        ),
        "tools/call" => handle_tools_call(dispatcher, request.id, request.params).await,
        _ => JsonRpcResponse::error(
            request.id,
            METHOD_NOT_FOUND,
            &format!("Method not found: {}", request.method),
        ),
    };

    Some(response)
}

/// Handle initialize request.
fn handle_initialize(id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
    let params: InitializeParams = params
        .and_then(|p| serde_json::from_value(p).ok())
        .unwrap_or_default();
    if let Some(client) = &params.client_info {
        info!(
            "Client connected: {} {} (protocol {})",
            client.name,
            client.version,
            params.protocol_version.as_deref().unwrap_or("unknown")
        );
    }

    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: ToolsCapability { list_changed: false },
        },
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
        },
    };

    to_value(id, &result)
}

/// Handle tools/call request.
async fn handle_tools_call(
    dispatcher: &ToolDispatcher,
    id: Option<Value>,
    params: Option<Value>,
) -> JsonRpcResponse {
    let params: ToolCallParams = match params {
        Some(p) => match serde_json::from_value(p) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, &format!("Invalid params: {}", e))
            }
        },
        None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
    };

    match dispatcher.call(&params.name, params.arguments.as_ref()).await {
        Ok(text) => to_value(id, &ToolCallResult::text(text)),
        Err(e) => {
            let code = if e.is_caller_error() {
                INVALID_PARAMS
            } else {
                INTERNAL_ERROR
            };
            JsonRpcResponse::error(id, code, &e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::mock::{test_settings, Generation, MockApi};

    fn dispatcher() -> ToolDispatcher {
        ToolDispatcher::new(
            Arc::new(test_settings()),
            Arc::new(MockApi::new(Generation::Text("analysis"))),
        )
    }

    fn request(raw: Value) -> JsonRpcRequest {
        serde_json::from_value(raw).unwrap()
    }

    async fn respond(raw: Value) -> Value {
        let response = handle_request(&dispatcher(), request(raw)).await.unwrap();
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let value = respond(json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test-host", "version": "1.0"}
            }
        }))
        .await;
        assert_eq!(value["result"]["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(value["result"]["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let response = handle_request(
            &dispatcher(),
            request(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
        )
        .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let value = respond(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        let tools = value["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 3);
        assert_eq!(tools[0]["name"], "analyzeLocalVideo");
        assert!(tools[0]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let value = respond(json!({
            "jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": {"name": "analyzeRemoteVideo", "arguments": {"videoUrl": "https://youtu.be/x"}}
        }))
        .await;
        assert_eq!(
            value["result"],
            json!({"content": [{"type": "text", "text": "analysis"}]})
        );
    }

    #[tokio::test]
    async fn test_tools_call_invalid_arguments() {
        let value = respond(json!({
            "jsonrpc": "2.0", "id": 4, "method": "tools/call",
            "params": {"name": "analyzeLocalVideo", "arguments": {}}
        }))
        .await;
        assert_eq!(value["error"]["code"], INVALID_PARAMS);
        assert!(value["error"]["message"].as_str().unwrap().contains("filePath"));
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool() {
        let value = respond(json!({
            "jsonrpc": "2.0", "id": 5, "method": "tools/call",
            "params": {"name": "nope"}
        }))
        .await;
        assert_eq!(value["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let value = respond(json!({"jsonrpc": "2.0", "id": 6, "method": "resources/list"})).await;
        assert_eq!(value["error"]["code"], METHOD_NOT_FOUND);
    }
}
