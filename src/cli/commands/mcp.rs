//! MCP command implementation.

use crate::config::Settings;
use crate::gemini::GeminiHttpClient;
use crate::mcp::{McpServer, ToolDispatcher};
use anyhow::Result;
use std::sync::Arc;

/// Run the MCP server on stdio.
pub async fn run_mcp(settings: Settings) -> Result<()> {
    let api = Arc::new(GeminiHttpClient::new(&settings)?);
    let model = settings.gemini.model.clone();
    let dispatcher = ToolDispatcher::new(Arc::new(settings), api);
    let server = McpServer::new(dispatcher);

    // stdout is the protocol channel; status goes to stderr
    eprintln!("Gemini Video MCP Server ready (model: {})", model);

    server.run().await
}
