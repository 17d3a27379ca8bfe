//! Analyze commands: run a single analysis from the terminal.

use crate::cli::Output;
use crate::config::Settings;
use crate::gemini::{GeminiHttpClient, LocalVideoRequest, RemoteVideoRequest, VideoAnalyzer};
use anyhow::Result;
use std::sync::Arc;

fn analyzer(settings: &Settings) -> Result<VideoAnalyzer> {
    let api = Arc::new(GeminiHttpClient::new(settings)?);
    Ok(VideoAnalyzer::new(settings, api))
}

fn print_result(text: &str) {
    if text.trim().is_empty() {
        Output::warning("Gemini returned no textual response.");
    } else {
        println!("{}", text);
    }
}

/// Analyze a local video file.
pub async fn run_analyze_local(request: LocalVideoRequest, settings: Settings) -> Result<()> {
    let analyzer = analyzer(&settings)?;

    let spinner = Output::spinner(&format!("Analyzing {}...", request.file_path));
    let result = analyzer.analyze_local(&request).await;
    spinner.finish_and_clear();

    match result {
        Ok(text) => {
            print_result(&text);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Gemini local video check failed: {}", e));
            Err(e.into())
        }
    }
}

/// Analyze a remote video URL.
pub async fn run_analyze_remote(request: RemoteVideoRequest, settings: Settings) -> Result<()> {
    let analyzer = analyzer(&settings)?;

    let spinner = Output::spinner(&format!("Analyzing {}...", request.video_url));
    let result = analyzer.analyze_remote(&request).await;
    spinner.finish_and_clear();

    match result {
        Ok(text) => {
            print_result(&text);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Gemini remote video check failed: {}", e));
            if e.is_permission_denied() {
                Output::info("The video may be private, unlisted, or a live-stream archive. Make it public and try again.");
            }
            Err(e.into())
        }
    }
}
