//! Configuration module.
//!
//! Resolves the Gemini credential and model from the environment, an optional
//! TOML file, and (as a last resort) the user's shell profile.

mod profile;
mod settings;

pub use profile::ProfileScanner;
pub use settings::{
    CredentialSettings, CredentialSource, GeminiSettings, Settings, API_BASE_URL_VAR,
    API_KEY_ALT_VAR, API_KEY_VAR, DEFAULT_API_BASE_URL, DEFAULT_MODEL_NAME,
    MAX_INLINE_FILE_BYTES, MODEL_VAR,
};
