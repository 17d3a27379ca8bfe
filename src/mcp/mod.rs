//! MCP (Model Context Protocol) server.
//!
//! Exposes the video analysis tools to AI assistants.
//! Implements JSON-RPC 2.0 over stdio.

mod dispatcher;
mod protocol;
mod server;
mod tools;

pub use dispatcher::{mask_api_key, summarize_environment, ToolDispatcher};
pub use protocol::Tool;
pub use server::McpServer;
pub use tools::{
    get_tools, validate_environment_args, validate_local_args, validate_remote_args, ToolName,
};
