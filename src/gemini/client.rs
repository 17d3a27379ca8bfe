//! Gemini REST API client.

use super::response::ModelResponse;
use crate::best_effort;
use crate::config::Settings;
use crate::error::{Result, VideoMcpError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument, warn};

/// Connection timeout. Requests themselves are not time-limited.
const CONNECT_TIMEOUT_SECS: u64 = 30;
/// Delay between file state polls while Gemini processes an upload.
const FILE_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Maximum number of file state polls.
const FILE_POLL_ATTEMPTS: u32 = 90;

/// A file stored on the Gemini side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadedFile {
    /// Resource name, e.g. `files/abc123`. Needed for deletion.
    pub name: Option<String>,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    pub state: Option<String>,
}

impl UploadedFile {
    /// Read the `file` object of an upload response, keeping every usable field.
    ///
    /// A malformed body must not hide the resource name from the caller, who has
    /// to delete the artifact.
    fn from_upload_body(body: &str) -> Self {
        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                warn!("Upload response is not JSON: {}", e);
                return Self::default();
            }
        };

        let file = value.get("file").unwrap_or(&Value::Null);
        let field = |key: &str| file.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: field("name"),
            uri: field("uri"),
            mime_type: field("mimeType"),
            state: field("state"),
        }
    }

    fn is_processing(&self) -> bool {
        self.state.as_deref() == Some("PROCESSING")
    }

    /// Whether Gemini reported that processing failed.
    pub fn is_failed(&self) -> bool {
        self.state.as_deref() == Some("FAILED")
    }
}

/// A single-video generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub model: String,
    pub file_uri: String,
    pub mime_type: String,
    pub prompt: String,
}

/// Operations the analyzer needs from the Gemini API.
#[async_trait]
pub trait GeminiApi: Send + Sync {
    /// Upload a local file. Returns whatever the API reported, even if incomplete.
    async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<UploadedFile>;

    /// Run `generateContent` with one file reference and a text prompt.
    async fn generate_content(&self, request: &GenerateRequest) -> Result<ModelResponse>;

    /// Delete an uploaded file by resource name.
    async fn delete_file(&self, name: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct GenerateContentBody {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

impl GenerateContentBody {
    fn for_request(request: &GenerateRequest) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::FileData {
                        file_data: FileData {
                            mime_type: request.mime_type.clone(),
                            file_uri: request.file_uri.clone(),
                        },
                    },
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Build an API error from a non-success response.
fn api_error(status: StatusCode, body: &str) -> VideoMcpError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => VideoMcpError::Api {
            status: status.as_u16(),
            code: envelope.error.status,
            message: if envelope.error.message.is_empty() {
                status.to_string()
            } else {
                envelope.error.message
            },
        },
        Err(_) => VideoMcpError::Api {
            status: status.as_u16(),
            code: None,
            message: if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            },
        },
    }
}

/// Turn a response into an error unless it succeeded.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

/// HTTP implementation of [`GeminiApi`].
pub struct GeminiHttpClient {
    http: Client,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl GeminiHttpClient {
    /// Create a client from resolved settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_key: settings.gemini.api_key.clone(),
            base_url: settings.gemini.api_base_url.trim_end_matches('/').to_string(),
            poll_interval: FILE_POLL_INTERVAL,
            poll_attempts: FILE_POLL_ATTEMPTS,
        })
    }

    /// Override how often and how many times an upload's state is polled.
    pub fn with_polling(mut self, interval: Duration, attempts: u32) -> Self {
        self.poll_interval = interval;
        self.poll_attempts = attempts;
        self
    }

    fn api_key_header(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.api_key)
            .map_err(|_| VideoMcpError::Config("API key contains invalid characters".to_string()))
    }

    fn model_url(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn file_url(&self, name: &str) -> String {
        format!("{}/v1beta/{}", self.base_url, name)
    }

    /// Open a resumable upload session and return its upload URL.
    async fn start_upload(&self, display_name: &str, mime_type: &str, length: u64) -> Result<String> {
        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", self.api_key_header()?);
        headers.insert("x-goog-upload-protocol", HeaderValue::from_static("resumable"));
        headers.insert("x-goog-upload-command", HeaderValue::from_static("start"));
        headers.insert(
            "x-goog-upload-header-content-length",
            HeaderValue::from(length),
        );
        headers.insert(
            "x-goog-upload-header-content-type",
            HeaderValue::from_str(mime_type)
                .map_err(|_| VideoMcpError::Upload(format!("Invalid MIME type: {}", mime_type)))?,
        );

        let response = self
            .http
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .headers(headers)
            .json(&json!({"file": {"display_name": display_name}}))
            .send()
            .await?;
        let response = check_status(response).await?;

        response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| VideoMcpError::Upload("missing X-Goog-Upload-URL header".to_string()))
    }

    async fn get_file(&self, name: &str) -> Result<UploadedFile> {
        let response = self
            .http
            .get(self.file_url(name))
            .header("x-goog-api-key", self.api_key_header()?)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Poll until the file leaves `PROCESSING`.
    ///
    /// Never fails: the caller owns the artifact and must be able to delete it, so
    /// polling problems are logged and the last known state is returned.
    async fn wait_until_processed(&self, mut file: UploadedFile) -> UploadedFile {
        let Some(name) = file.name.clone() else {
            return file;
        };

        let mut attempt = 0;
        while file.is_processing() && attempt < self.poll_attempts {
            tokio::time::sleep(self.poll_interval).await;
            attempt += 1;
            debug!("Polling {} (attempt {})", name, attempt);

            match best_effort::attempt(
                &format!("Polling state of {}", name),
                self.get_file(&name).await,
            ) {
                Some(latest) => file = latest,
                None => break,
            }
        }

        if file.is_processing() {
            warn!("{} is still processing after {} polls", name, attempt);
        }
        file
    }
}

#[async_trait]
impl GeminiApi for GeminiHttpClient {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<UploadedFile> {
        let video = tokio::fs::File::open(path).await?;
        let length = video.metadata().await?.len();
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");

        debug!("Uploading {} bytes as {}", length, mime_type);
        let upload_url = self.start_upload(display_name, mime_type, length).await?;

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-upload-command", HeaderValue::from_static("upload, finalize"));
        headers.insert("x-goog-upload-offset", HeaderValue::from_static("0"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        if let Ok(content_type) = HeaderValue::from_str(mime_type) {
            headers.insert(CONTENT_TYPE, content_type);
        }

        let response = self
            .http
            .post(&upload_url)
            .headers(headers)
            .body(Body::wrap_stream(ReaderStream::new(video)))
            .send()
            .await?;
        let response = check_status(response).await?;
        let uploaded = UploadedFile::from_upload_body(&response.text().await?);

        debug!("Uploaded as {:?} (state {:?})", uploaded.name, uploaded.state);
        Ok(self.wait_until_processed(uploaded).await)
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate_content(&self, request: &GenerateRequest) -> Result<ModelResponse> {
        let body = GenerateContentBody::for_request(request);

        let response = self
            .http
            .post(self.model_url(&request.model))
            .header("x-goog-api-key", self.api_key_header()?)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let value: Value = response.json().await?;
        Ok(ModelResponse::from_value(&value))
    }

    #[instrument(skip(self))]
    async fn delete_file(&self, name: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.file_url(name))
            .header("x-goog-api-key", self.api_key_header()?)
            .send()
            .await?;
        check_status(response).await?;
        debug!("Deleted {}", name);
        Ok(())
    }
}
