//! Check command - show what configuration the server would run with.

use crate::cli::Output;
use crate::config::{Settings, DEFAULT_API_BASE_URL};
use crate::mcp::summarize_environment;
use anyhow::Result;

/// Print the environment summary the `checkEnvironment` tool returns.
pub fn run_check(settings: &Settings, config_path: &str) -> Result<()> {
    Output::header("Gemini Video MCP");
    println!();
    println!("{}", summarize_environment(settings));
    println!();

    Output::kv("Config file", config_path);
    if settings.gemini.api_base_url != DEFAULT_API_BASE_URL {
        Output::kv("API base URL", &settings.gemini.api_base_url);
    }
    Output::kv("Inline size limit", &format_size(settings.max_inline_bytes()));

    println!();
    Output::success("Configuration loaded.");
    Ok(())
}

/// Format bytes to human-readable size.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
