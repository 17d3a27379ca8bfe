//! Error types for the Gemini video MCP server.

use thiserror::Error;

/// Library-level error type.
#[derive(Error, Debug)]
pub enum VideoMcpError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Local video file not found: {0}")]
    NotFound(String),

    #[error("Expected a file but found something else at: {0}")]
    NotAFile(String),

    #[error(
        "Local video file exceeds inline upload limit ({actual} bytes > {allowed} bytes). \
         Use a smaller file or a remote URL."
    )]
    SizeLimit { actual: u64, allowed: u64 },

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Unknown tool requested: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    InvalidArguments(String),

    #[error("Gemini API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl VideoMcpError {
    /// Whether the provider refused access to the referenced resource.
    ///
    /// Matches the structured status/code first and falls back to the
    /// message text, since some denials arrive wrapped in other errors.
    pub fn is_permission_denied(&self) -> bool {
        if let VideoMcpError::Api { status, code, .. } = self {
            if *status == 403 || code.as_deref() == Some("PERMISSION_DENIED") {
                return true;
            }
        }

        let message = self.to_string().to_lowercase();
        message.contains("permission denied")
            || message.contains("does not have permission")
            || message.contains("403")
    }

    /// Caller-side protocol misuse rather than a failure while doing the work.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            VideoMcpError::UnknownTool(_) | VideoMcpError::InvalidArguments(_)
        )
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, VideoMcpError>;
