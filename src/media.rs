//! Local media file helpers.
//!
//! Path resolution, size checks, base64 encoding and MIME type guessing for
//! files handed to the analyzer.

use crate::error::{Result, VideoMcpError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fallback when the extension tells us nothing.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Extension to MIME type table for the formats Gemini accepts.
const MIME_TYPES: &[(&str, &str)] = &[
    // Video
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("qt", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("webm", "video/webm"),
    ("mkv", "video/x-matroska"),
    ("mpeg", "video/mpeg"),
    ("mpg", "video/mpeg"),
    ("3gp", "video/3gpp"),
    ("3gpp", "video/3gpp"),
    // Audio
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("aac", "audio/aac"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
    ("opus", "audio/opus"),
    ("m4a", "audio/mp4"),
    ("aiff", "audio/aiff"),
];

/// A local file that exists and is a regular file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub resolved_path: PathBuf,
    pub size_in_bytes: u64,
}

/// A local file read into memory as base64.
#[derive(Debug, Clone)]
pub struct EncodedFile {
    pub resolved_path: PathBuf,
    pub size_in_bytes: u64,
    pub encoded_data: String,
}

/// Resolve `path` against the current directory without touching symlinks.
fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Resolve a path and check it points at a regular file.
pub async fn ensure_readable(path: impl AsRef<Path>) -> Result<ResolvedFile> {
    let resolved_path = absolutize(path.as_ref())?;

    let metadata = tokio::fs::metadata(&resolved_path)
        .await
        .map_err(|_| VideoMcpError::NotFound(resolved_path.display().to_string()))?;

    if !metadata.is_file() {
        return Err(VideoMcpError::NotAFile(resolved_path.display().to_string()));
    }

    Ok(ResolvedFile {
        resolved_path,
        size_in_bytes: metadata.len(),
    })
}

/// Read a file as base64, refusing anything larger than `max_bytes`.
pub async fn read_as_encoded(path: impl AsRef<Path>, max_bytes: u64) -> Result<EncodedFile> {
    let ResolvedFile {
        resolved_path,
        size_in_bytes,
    } = ensure_readable(path).await?;

    if size_in_bytes > max_bytes {
        return Err(VideoMcpError::SizeLimit {
            actual: size_in_bytes,
            allowed: max_bytes,
        });
    }

    let bytes = tokio::fs::read(&resolved_path).await?;
    debug!("Encoded {} bytes from {}", bytes.len(), resolved_path.display());

    Ok(EncodedFile {
        resolved_path,
        size_in_bytes,
        encoded_data: STANDARD.encode(bytes),
    })
}

/// Guess a MIME type from the file extension (case-insensitive).
pub fn guess_mime_type(path: impl AsRef<Path>) -> Option<&'static str> {
    let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}
