//! Gemini integration: REST client, response normalization and video analysis.

mod analyzer;
mod client;
mod response;

pub use analyzer::{
    resolve_prompt, LocalVideoRequest, RemoteVideoRequest, VideoAnalyzer, DEFAULT_PROMPT,
    REMOTE_VIDEO_MIME_TYPE,
};
pub use client::{GeminiApi, GeminiHttpClient, GenerateRequest, UploadedFile};
pub use response::{extract_text, Candidate, ContentPart, ModelResponse, TextAccessor, TextSource};

#[cfg(test)]
pub(crate) use analyzer::tests as mock;
