//! Routes validated tool calls to the analyzer.

use super::protocol::Tool;
use super::tools::{
    get_tools, validate_environment_args, validate_local_args, validate_remote_args, ToolName,
};
use crate::config::{Settings, API_KEY_VAR};
use crate::error::{Result, VideoMcpError};
use crate::gemini::{GeminiApi, VideoAnalyzer};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Validates tool arguments, runs the tool, and shapes its text output.
pub struct ToolDispatcher {
    settings: Arc<Settings>,
    analyzer: VideoAnalyzer,
}

impl ToolDispatcher {
    pub fn new(settings: Arc<Settings>, api: Arc<dyn GeminiApi>) -> Self {
        let analyzer = VideoAnalyzer::new(&settings, api);
        Self { settings, analyzer }
    }

    /// The tool catalog.
    pub fn tools(&self) -> Vec<Tool> {
        get_tools()
    }

    /// Run the named tool.
    ///
    /// Failures are logged with the tool name and arguments. A permission denial
    /// on `analyzeRemoteVideo` becomes an explanatory text result instead of an
    /// error; everything else is returned to the caller.
    pub async fn call(&self, name: &str, arguments: Option<&Value>) -> Result<String> {
        let result = match ToolName::parse(name) {
            Some(tool) => self
                .run(tool, arguments)
                .await
                .map(|text| to_tool_text(text, tool)),
            None => Err(VideoMcpError::UnknownTool(name.to_string())),
        };

        result.or_else(|e| {
            error!(
                tool = name,
                args = %safe_serialize(arguments),
                "Tool execution failed ({}): {:?}",
                name,
                e
            );

            if name == ToolName::AnalyzeRemoteVideo.as_str() && e.is_permission_denied() {
                let url = arguments
                    .and_then(|a| a.get("videoUrl"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                warn!("Permission denied for remote video; returning guidance instead");
                return Ok(permission_denied_message(url, &e));
            }

            Err(e)
        })
    }

    async fn run(&self, tool: ToolName, arguments: Option<&Value>) -> Result<String> {
        match tool {
            ToolName::AnalyzeLocalVideo => {
                let request = validate_local_args(arguments)?;
                info!("analyzeLocalVideo: {}", request.file_path);
                self.analyzer.analyze_local(&request).await
            }
            ToolName::AnalyzeRemoteVideo => {
                let request = validate_remote_args(arguments)?;
                info!("analyzeRemoteVideo: {}", request.video_url);
                self.analyzer.analyze_remote(&request).await
            }
            ToolName::CheckEnvironment => {
                validate_environment_args(arguments)?;
                Ok(summarize_environment(&self.settings))
            }
        }
    }
}

/// Replace an empty result with a notice naming the tool.
fn to_tool_text(text: String, tool: ToolName) -> String {
    if text.trim().is_empty() {
        format!("Gemini returned no textual response for {}.", tool)
    } else {
        text
    }
}

/// Arguments as compact JSON for logging.
fn safe_serialize(arguments: Option<&Value>) -> String {
    match arguments {
        Some(value) => serde_json::to_string(value)
            .unwrap_or_else(|_| "[unserializable arguments]".to_string()),
        None => "null".to_string(),
    }
}

/// Friendly explanation for a video Gemini is not allowed to read.
fn permission_denied_message(url: &str, error: &VideoMcpError) -> String {
    let lines = [
        "動画へのアクセスが拒否されました (permission denied)。".to_string(),
        format!("URL: {}", url),
        String::new(),
        "考えられる原因:".to_string(),
        "- 動画が非公開、または限定公開に設定されている".to_string(),
        "- ライブ配信のアーカイブで、まだ一般公開されていない".to_string(),
        "- 地域制限や年齢制限により Gemini から参照できない".to_string(),
        String::new(),
        "対処方法: 動画を公開設定にしてから再度お試しください。公開できない場合は、動画をダウンロードして analyzeLocalVideo で解析してください。".to_string(),
        String::new(),
        format!("詳細: {}", error),
    ];
    lines.join("\n")
}

/// Summary of the loaded configuration, with the API key masked.
pub fn summarize_environment(settings: &Settings) -> String {
    [
        "環境変数の読み込み結果:".to_string(),
        format!("- {}: {}", API_KEY_VAR, mask_api_key(&settings.gemini.api_key)),
        format!("- モデル: {}", settings.gemini.model),
    ]
    .join("\n")
}

/// Mask an API key: first 4 and last 2 characters, plus the length.
///
/// Keys of 8 characters or fewer are shown in full with their length.
pub fn mask_api_key(api_key: &str) -> String {
    let trimmed = api_key.trim();
    if trimmed.is_empty() {
        return "未設定".to_string();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let len = chars.len();
    if len <= 8 {
        return format!("{} (長さ: {})", trimmed, len);
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[len - 2..].iter().collect();
    format!("{}…{} (長さ: {})", head, tail, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::mock::{test_settings, Generation, MockApi};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn dispatcher(api: Arc<MockApi>) -> ToolDispatcher {
        ToolDispatcher::new(Arc::new(test_settings()), api)
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key(""), "未設定");
        assert_eq!(mask_api_key("   "), "未設定");
        assert_eq!(mask_api_key("short"), "short (長さ: 5)");
        assert_eq!(mask_api_key("12345678"), "12345678 (長さ: 8)");
        assert_eq!(mask_api_key("AIzaSyABCDEFGHIJK"), "AIza…JK (長さ: 17)");
    }

    #[tokio::test]
    async fn test_check_environment_masks_key() {
        let api = Arc::new(MockApi::new(Generation::Text("unused")));
        let text = dispatcher(api.clone())
            .call("checkEnvironment", None)
            .await
            .unwrap();

        assert!(text.contains("AIza…JK (長さ: 17)"));
        assert!(!text.contains("AIzaSyABCDEFGHIJK"));
        assert!(text.contains("gemini-2.5-flash"));
        assert_eq!(api.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let api = Arc::new(MockApi::new(Generation::Text("unused")));
        let err = dispatcher(api)
            .call("deleteEverything", Some(&json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, VideoMcpError::UnknownTool(_)));
        assert!(err.to_string().contains("deleteEverything"));
    }

    #[tokio::test]
    async fn test_missing_file_path_fails_before_network() {
        let api = Arc::new(MockApi::new(Generation::Text("unused")));
        let err = dispatcher(api.clone())
            .call("analyzeLocalVideo", Some(&json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, VideoMcpError::InvalidArguments(_)));
        assert!(err.to_string().contains("filePath: string"));
        assert_eq!(api.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let api = Arc::new(MockApi::new(Generation::Text("unused")));
        let err = dispatcher(api.clone())
            .call("analyzeLocalVideo", Some(&json!({"filePath": "missing.mp4"})))
            .await
            .unwrap_err();

        let expected = std::env::current_dir().unwrap().join("missing.mp4");
        let message = err.to_string();
        assert!(message.contains("not found"));
        assert!(message.contains(&expected.display().to_string()));
        assert_eq!(api.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_remote_permission_denied_returns_guidance() {
        let api = Arc::new(MockApi::new(Generation::Fail(
            403,
            "The caller does not have permission",
        )));
        let text = dispatcher(api)
            .call("analyzeRemoteVideo", Some(&json!({"videoUrl": "https://youtu.be/x"})))
            .await
            .unwrap();

        assert!(text.contains("動画を公開設定にして"));
        assert!(text.contains("https://youtu.be/x"));
        assert!(text.contains("限定公開"));
    }

    #[tokio::test]
    async fn test_remote_other_errors_propagate() {
        let api = Arc::new(MockApi::new(Generation::Fail(500, "internal")));
        let err = dispatcher(api)
            .call("analyzeRemoteVideo", Some(&json!({"videoUrl": "https://youtu.be/x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, VideoMcpError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_local_permission_denied_is_not_rewritten() {
        let api = Arc::new(MockApi::new(Generation::Fail(403, "permission denied")));
        let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"data").unwrap();

        let err = dispatcher(api.clone())
            .call(
                "analyzeLocalVideo",
                Some(&json!({"filePath": file.path().to_string_lossy()})),
            )
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(api.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_result_gets_placeholder() {
        let api = Arc::new(MockApi::new(Generation::Text("   ")));
        let text = dispatcher(api)
            .call("analyzeRemoteVideo", Some(&json!({"videoUrl": "https://youtu.be/x"})))
            .await
            .unwrap();
        assert_eq!(text, "Gemini returned no textual response for analyzeRemoteVideo.");
    }

    #[tokio::test]
    async fn test_remote_success() {
        let api = Arc::new(MockApi::new(Generation::Text("A cat video.")));
        let text = dispatcher(api.clone())
            .call(
                "analyzeRemoteVideo",
                Some(&json!({"videoUrl": "https://youtu.be/x", "prompt": "What animal?"})),
            )
            .await
            .unwrap();
        assert_eq!(text, "A cat video.");
        assert_eq!(api.last_request().prompt, "What animal?");
    }
}
