//! Gemini Video MCP - video analysis tools for AI assistants
//!
//! An MCP server that lets an assistant hand a local video file or a video URL
//! to Gemini and get a text analysis back.
//!
//! # Overview
//!
//! - `analyzeLocalVideo` uploads a local file, analyzes it, and deletes the upload
//! - `analyzeRemoteVideo` analyzes a URL Gemini can fetch (e.g. YouTube)
//! - `checkEnvironment` reports whether the API key was found and which model is active
//!
//! # Architecture
//!
//! - `config` - Credential and model resolution
//! - `media` - Local file checks, encoding and MIME type guessing
//! - `gemini` - REST client, response normalization and the video analyzer
//! - `mcp` - Tool catalog, dispatcher and the stdio JSON-RPC server
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gemini_video_mcp::config::Settings;
//! use gemini_video_mcp::gemini::{GeminiHttpClient, RemoteVideoRequest, VideoAnalyzer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let api = Arc::new(GeminiHttpClient::new(&settings)?);
//!     let analyzer = VideoAnalyzer::new(&settings, api);
//!
//!     let text = analyzer
//!         .analyze_remote(&RemoteVideoRequest {
//!             video_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
//!             prompt: Some("Summarize this video in three bullet points.".to_string()),
//!             model: None,
//!         })
//!         .await?;
//!     println!("{}", text);
//!
//!     Ok(())
//! }
//! ```

pub mod best_effort;
pub mod cli;
pub mod config;
pub mod error;
pub mod gemini;
pub mod mcp;
pub mod media;

pub use error::{Result, VideoMcpError};
