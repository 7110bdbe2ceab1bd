//! TOML configuration file loading
//!
//! Supports `~/.config/coachline/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct CoachlineConfigFile {
    /// Product variant ("strategy" or "nutrition")
    #[serde(default)]
    pub variant: Option<String>,

    /// Assistant backend configuration
    #[serde(default)]
    pub backend: BackendFileConfig,

    /// Export configuration
    #[serde(default)]
    pub export: ExportFileConfig,
}

/// Assistant backend configuration
#[derive(Debug, Default, Deserialize)]
pub struct BackendFileConfig {
    /// Base URL (e.g. "http://localhost:8000")
    pub url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Export configuration
#[derive(Debug, Default, Deserialize)]
pub struct ExportFileConfig {
    /// Directory exported boards are written to
    pub dir: Option<String>,
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the content is not valid TOML for this schema
pub fn parse_config(content: &str) -> Result<CoachlineConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Load the TOML config file from the standard path
///
/// Returns `CoachlineConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file() -> CoachlineConfigFile {
    let Some(path) = config_file_path() else {
        return CoachlineConfigFile::default();
    };

    if !path.exists() {
        return CoachlineConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match parse_config(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                CoachlineConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            CoachlineConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/coachline/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("coachline").join("config.toml"))
}
