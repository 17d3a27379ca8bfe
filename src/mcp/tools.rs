//! MCP tool catalog and argument validation.

use super::protocol::Tool;
use crate::error::{Result, VideoMcpError};
use crate::gemini::{LocalVideoRequest, RemoteVideoRequest, DEFAULT_PROMPT};
use serde_json::{json, Map, Value};
use std::fmt;

/// Tools exposed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    AnalyzeLocalVideo,
    AnalyzeRemoteVideo,
    CheckEnvironment,
}

impl ToolName {
    pub const ALL: [ToolName; 3] = [
        ToolName::AnalyzeLocalVideo,
        ToolName::AnalyzeRemoteVideo,
        ToolName::CheckEnvironment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::AnalyzeLocalVideo => "analyzeLocalVideo",
            ToolName::AnalyzeRemoteVideo => "analyzeRemoteVideo",
            ToolName::CheckEnvironment => "checkEnvironment",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    /// Human-readable argument shape, used in validation errors.
    pub fn expected_shape(&self) -> &'static str {
        match self {
            ToolName::AnalyzeLocalVideo => {
                "{ filePath: string, prompt?: string, mimeType?: string, model?: string }"
            }
            ToolName::AnalyzeRemoteVideo => "{ videoUrl: string, prompt?: string, model?: string }",
            ToolName::CheckEnvironment => "{} (no arguments are required)",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ToolName::AnalyzeLocalVideo => {
                "Analyze a local video file with Gemini. The file is uploaded, analyzed \
                 with the given prompt (a detailed sectioned summary by default), and \
                 deleted from Gemini afterwards."
            }
            ToolName::AnalyzeRemoteVideo => {
                "Analyze a publicly accessible video URL (e.g. YouTube) with Gemini."
            }
            ToolName::CheckEnvironment => {
                "Check whether GOOGLE_API_KEY is loaded and summarize the current configuration."
            }
        }
    }

    fn input_schema(&self) -> Value {
        let prompt = json!({
            "type": "string",
            "description": "Optional custom instruction for Gemini video analysis.",
            "default": DEFAULT_PROMPT
        });
        let model = json!({
            "type": "string",
            "description": "Override Gemini model name (defaults to the server's configured model)."
        });

        match self {
            ToolName::AnalyzeLocalVideo => json!({
                "type": "object",
                "properties": {
                    "filePath": {
                        "type": "string",
                        "description": "Absolute or relative path to a local video file."
                    },
                    "prompt": prompt,
                    "mimeType": {
                        "type": "string",
                        "description": "MIME type for the provided file (guessed from the extension when omitted)."
                    },
                    "model": model
                },
                "required": ["filePath"],
                "additionalProperties": false
            }),
            ToolName::AnalyzeRemoteVideo => json!({
                "type": "object",
                "properties": {
                    "videoUrl": {
                        "type": "string",
                        "format": "uri",
                        "description": "Remote video URL supported by Gemini (e.g., YouTube)."
                    },
                    "prompt": prompt,
                    "model": model
                },
                "required": ["videoUrl"],
                "additionalProperties": false
            }),
            ToolName::CheckEnvironment => json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        }
    }

    pub fn definition(&self) -> Tool {
        Tool {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Get all available tools.
pub fn get_tools() -> Vec<Tool> {
    ToolName::ALL.iter().map(ToolName::definition).collect()
}

fn invalid(tool: ToolName, problem: &str) -> VideoMcpError {
    VideoMcpError::InvalidArguments(format!(
        "Invalid arguments for {}: {}. Expecting {}.",
        tool,
        problem,
        tool.expected_shape()
    ))
}

fn object_args(tool: ToolName, args: Option<&Value>) -> Result<&Map<String, Value>> {
    match args {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(invalid(tool, "arguments must be an object")),
        None => Err(invalid(tool, "arguments are missing")),
    }
}

fn required_string(tool: ToolName, args: &Map<String, Value>, key: &str) -> Result<String> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(invalid(tool, &format!("`{}` must be a string", key))),
        None => Err(invalid(tool, &format!("missing required `{}`", key))),
    }
}

fn optional_string(tool: ToolName, args: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match args.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(tool, &format!("`{}` must be a string when provided", key))),
    }
}

/// Validate `analyzeLocalVideo` arguments.
pub fn validate_local_args(args: Option<&Value>) -> Result<LocalVideoRequest> {
    let tool = ToolName::AnalyzeLocalVideo;
    let args = object_args(tool, args)?;

    Ok(LocalVideoRequest {
        file_path: required_string(tool, args, "filePath")?,
        prompt: optional_string(tool, args, "prompt")?,
        mime_type: optional_string(tool, args, "mimeType")?,
        model: optional_string(tool, args, "model")?,
    })
}

/// Validate `analyzeRemoteVideo` arguments. The URL must be absolute.
pub fn validate_remote_args(args: Option<&Value>) -> Result<RemoteVideoRequest> {
    let tool = ToolName::AnalyzeRemoteVideo;
    let args = object_args(tool, args)?;

    let video_url = required_string(tool, args, "videoUrl")?;
    if let Err(e) = url::Url::parse(video_url.trim()) {
        return Err(invalid(tool, &format!("`videoUrl` is not a valid URL ({})", e)));
    }

    Ok(RemoteVideoRequest {
        video_url: video_url.trim().to_string(),
        prompt: optional_string(tool, args, "prompt")?,
        model: optional_string(tool, args, "model")?,
    })
}

/// Validate `checkEnvironment` arguments: absent or an object.
pub fn validate_environment_args(args: Option<&Value>) -> Result<()> {
    match args {
        None | Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(invalid(ToolName::CheckEnvironment, "arguments must be an object")),
    }
}
