//! CLI command implementations.

mod analyze;
mod check;
mod mcp;
mod tools;

pub use analyze::{run_analyze_local, run_analyze_remote};
pub use check::run_check;
pub use mcp::run_mcp;
pub use tools::run_tools;
