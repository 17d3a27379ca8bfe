//! Video analysis on top of the Gemini API.

use super::client::{GeminiApi, GenerateRequest, UploadedFile};
use super::response::extract_text;
use crate::best_effort;
use crate::config::Settings;
use crate::error::{Result, VideoMcpError};
use crate::media::{self, FALLBACK_MIME_TYPE};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const DEFAULT_PROMPT: &str = "最初にこの記事全体を要約し全体像を掴んだ後、大きなセクションごとに細かく要約を行ってください。 その次に小さなセクションごとに更に詳細な要約を行ってください。";

/// MIME type assumed for remote URLs.
pub const REMOTE_VIDEO_MIME_TYPE: &str = "video/mp4";

/// Analyze a video stored on the local filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalVideoRequest {
    pub file_path: String,
    pub prompt: Option<String>,
    pub mime_type: Option<String>,
    pub model: Option<String>,
}

/// Analyze a video Gemini can fetch by URL (e.g. YouTube).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteVideoRequest {
    pub video_url: String,
    pub prompt: Option<String>,
    pub model: Option<String>,
}

/// Trimmed value if it has any non-whitespace content.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The prompt to send: trimmed custom prompt, or the default.
pub fn resolve_prompt(prompt: Option<&str>) -> String {
    non_blank(prompt).unwrap_or(DEFAULT_PROMPT).to_string()
}

/// Runs video analysis requests against Gemini.
pub struct VideoAnalyzer {
    api: Arc<dyn GeminiApi>,
    default_model: String,
}

impl VideoAnalyzer {
    pub fn new(settings: &Settings, api: Arc<dyn GeminiApi>) -> Self {
        Self {
            api,
            default_model: settings.gemini.model.clone(),
        }
    }

    fn pick_model(&self, candidate: Option<&str>) -> String {
        non_blank(candidate).unwrap_or(&self.default_model).to_string()
    }

    /// Upload a local video, analyze it, and delete the upload.
    ///
    /// The uploaded file is deleted exactly once on every path after upload.
    /// Deletion failures are logged and never replace the analysis outcome.
    #[instrument(skip(self, request), fields(file_path = %request.file_path))]
    pub async fn analyze_local(&self, request: &LocalVideoRequest) -> Result<String> {
        let prompt = resolve_prompt(request.prompt.as_deref());
        let model = self.pick_model(request.model.as_deref());
        let mime_type = non_blank(request.mime_type.as_deref())
            .or_else(|| media::guess_mime_type(&request.file_path))
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string();

        let file = media::ensure_readable(&request.file_path).await?;
        info!(
            "Uploading {} ({} bytes, {})",
            file.resolved_path.display(),
            file.size_in_bytes,
            mime_type
        );

        let uploaded = self.api.upload_file(&file.resolved_path, &mime_type).await?;

        let (uri, uploaded_mime) = match (&uploaded.uri, &uploaded.mime_type) {
            (Some(uri), Some(mime)) if !uploaded.is_failed() => (uri.clone(), mime.clone()),
            _ => {
                self.cleanup(&uploaded).await;
                let reason = if uploaded.is_failed() {
                    "file processing failed on the Gemini side"
                } else {
                    "missing file URI or MIME type"
                };
                return Err(VideoMcpError::Upload(reason.to_string()));
            }
        };

        let generated = self
            .api
            .generate_content(&GenerateRequest {
                model,
                file_uri: uri,
                mime_type: uploaded_mime,
                prompt,
            })
            .await;

        self.cleanup(&uploaded).await;

        let response = generated?;
        Ok(extract_text(&response))
    }

    /// Analyze a video by URL. Nothing is uploaded.
    #[instrument(skip(self, request), fields(video_url = %request.video_url))]
    pub async fn analyze_remote(&self, request: &RemoteVideoRequest) -> Result<String> {
        let prompt = resolve_prompt(request.prompt.as_deref());
        let model = self.pick_model(request.model.as_deref());

        let response = self
            .api
            .generate_content(&GenerateRequest {
                model,
                file_uri: request.video_url.clone(),
                mime_type: REMOTE_VIDEO_MIME_TYPE.to_string(),
                prompt,
            })
            .await?;

        Ok(extract_text(&response))
    }

    /// Best-effort deletion of an uploaded file.
    async fn cleanup(&self, uploaded: &UploadedFile) {
        match uploaded.name.as_deref() {
            Some(name) => {
                best_effort::attempt(
                    &format!("Deleting uploaded file {}", name),
                    self.api.delete_file(name).await,
                );
            }
            None => debug!("Upload returned no resource name; nothing to delete"),
        }
    }
}
