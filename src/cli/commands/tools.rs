//! Tools command - print the MCP tool catalog.

use crate::mcp::get_tools;
use anyhow::Result;

/// Print the tool catalog as pretty JSON.
pub fn run_tools() -> Result<()> {
    let json = serde_json::to_string_pretty(&get_tools())?;
    println!("{}", json);
    Ok(())
}
