//! CLI module.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Gemini Video MCP - analyze local and remote videos with Gemini
///
/// Runs as an MCP server on stdio by default. The other subcommands run the
/// same operations directly from a terminal.
#[derive(Parser, Debug)]
#[command(name = "gemini-video-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the MCP server on stdio (default)
    Serve,

    /// Show the resolved configuration with the API key masked
    Check,

    /// Print the MCP tool catalog as JSON
    Tools,

    /// Upload and analyze a local video file
    AnalyzeLocal {
        /// Path to the video file
        file_path: String,

        /// Custom instruction for the analysis
        #[arg(short, long)]
        prompt: Option<String>,

        /// MIME type (guessed from the extension by default)
        #[arg(long)]
        mime_type: Option<String>,

        /// Gemini model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Analyze a video by URL (e.g. YouTube)
    AnalyzeRemote {
        /// Video URL
        video_url: String,

        /// Custom instruction for the analysis
        #[arg(short, long)]
        prompt: Option<String>,

        /// Gemini model to use
        #[arg(short, long)]
        model: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::parse_from(["gemini-video-mcp"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_analyze_local() {
        let cli = Cli::parse_from([
            "gemini-video-mcp",
            "-vv",
            "analyze-local",
            "clip.mp4",
            "--prompt",
            "Summarize",
            "--mime-type",
            "video/mp4",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::AnalyzeLocal {
                file_path,
                prompt,
                mime_type,
                model,
            }) => {
                assert_eq!(file_path, "clip.mp4");
                assert_eq!(prompt.as_deref(), Some("Summarize"));
                assert_eq!(mime_type.as_deref(), Some("video/mp4"));
                assert!(model.is_none());
            }
            other => panic!("Expected AnalyzeLocal, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_analyze_remote() {
        let cli = Cli::parse_from([
            "gemini-video-mcp",
            "analyze-remote",
            "https://youtu.be/x",
            "-m",
            "gemini-2.5-pro",
        ]);
        match cli.command {
            Some(Commands::AnalyzeRemote { video_url, model, .. }) => {
                assert_eq!(video_url, "https://youtu.be/x");
                assert_eq!(model.as_deref(), Some("gemini-2.5-pro"));
            }
            other => panic!("Expected AnalyzeRemote, got {:?}", other),
        }
    }
}
