//! Configuration settings for the Gemini video MCP server.

use super::profile::ProfileScanner;
use crate::error::{Result, VideoMcpError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Primary credential variable.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
/// Alternate credential variable accepted when the primary one is unset.
pub const API_KEY_ALT_VAR: &str = "GEMINI_API_KEY";
/// Model override variable.
pub const MODEL_VAR: &str = "GEMINI_MODEL";
/// API endpoint override variable.
pub const API_BASE_URL_VAR: &str = "GEMINI_API_BASE_URL";

pub const DEFAULT_MODEL_NAME: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// 20MB limit recommended for inline uploads.
pub const MAX_INLINE_FILE_BYTES: u64 = 20 * 1024 * 1024;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub gemini: GeminiSettings,
    pub credentials: CredentialSettings,
}

/// Gemini API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    /// Resolved API key. Never read from or written to the config file.
    #[serde(skip)]
    pub api_key: String,
    /// Default model for analysis requests.
    pub model: String,
    /// Base URL of the generative language API.
    pub api_base_url: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL_NAME.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

/// Where to look for a credential that is not in the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    /// Shell profiles scanned for `export GOOGLE_API_KEY=...`, in order.
    pub profile_files: Vec<String>,
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            profile_files: vec!["~/.zshrc".to_string(), "~/.bashrc".to_string()],
        }
    }
}

/// Where the API key was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Environment(&'static str),
    Profile(PathBuf),
}

impl Settings {
    /// Load settings from the default configuration file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment variables take precedence over the file. A key recovered from a
    /// shell profile is exported into the process environment.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            debug!("Reading config from {}", config_path.display());
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        let (settings, source) = settings.resolve(|name| std::env::var(name).ok())?;

        if let CredentialSource::Profile(profile) = &source {
            info!(
                "Loaded {} from {}; exporting it for this process",
                API_KEY_VAR,
                profile.display()
            );
            std::env::set_var(API_KEY_VAR, &settings.gemini.api_key);
        }

        Ok(settings)
    }

    /// Apply environment overrides and resolve the credential.
    ///
    /// `env` looks up a variable by name, which keeps this testable without
    /// touching the real process environment.
    pub fn resolve<F>(mut self, env: F) -> Result<(Self, CredentialSource)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            env(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(model) = non_empty(MODEL_VAR) {
            self.gemini.model = model;
        }
        self.gemini.model = self.gemini.model.trim().to_string();
        if self.gemini.model.is_empty() {
            self.gemini.model = DEFAULT_MODEL_NAME.to_string();
        }

        if let Some(base_url) = non_empty(API_BASE_URL_VAR) {
            self.gemini.api_base_url = base_url;
        }

        let (api_key, source) = if let Some(key) = non_empty(API_KEY_VAR) {
            (key, CredentialSource::Environment(API_KEY_VAR))
        } else if let Some(key) = non_empty(API_KEY_ALT_VAR) {
            (key, CredentialSource::Environment(API_KEY_ALT_VAR))
        } else {
            self.scan_profiles().ok_or_else(|| {
                VideoMcpError::Config(format!(
                    "Environment variable {} must be set for the Gemini MCP server.",
                    API_KEY_VAR
                ))
            })?
        };

        self.gemini.api_key = api_key;
        Ok((self, source))
    }

    /// Look through the configured shell profiles for an exported key.
    fn scan_profiles(&self) -> Option<(String, CredentialSource)> {
        let scanner = ProfileScanner::new();

        for profile in &self.credentials.profile_files {
            let path = Self::expand_path(profile);
            for name in [API_KEY_VAR, API_KEY_ALT_VAR] {
                if let Some(key) = scanner.scan_file(&path, name) {
                    return Some((key, CredentialSource::Profile(path)));
                }
            }
        }

        None
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gemini-video-mcp")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Ceiling for inline (base64) uploads. Not configurable.
    pub fn max_inline_bytes(&self) -> u64 {
        MAX_INLINE_FILE_BYTES
    }
}
