//! Configuration management for coachline

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use crate::Result;
use crate::variant::Variant;

use self::file::CoachlineConfigFile;

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default bound on a single backend call
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Product variant
    pub variant: Variant,

    /// Assistant backend base URL
    pub api_url: String,

    /// Bound on a single backend call
    pub request_timeout: Duration,

    /// Directory exported pin boards are written to
    pub export_dir: PathBuf,
}

impl Config {
    /// Load configuration (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if a configured value is invalid
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::resolve(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an env lookup
    ///
    /// # Errors
    ///
    /// Returns error if the variant name or timeout is invalid
    pub fn resolve(
        fc: CoachlineConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let variant = env("COACHLINE_VARIANT")
            .or(fc.variant)
            .map(|v| v.parse::<Variant>())
            .transpose()?
            .unwrap_or_default();

        let api_url = env("COACHLINE_API_URL")
            .or(fc.backend.url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = match env("COACHLINE_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                crate::Error::Config(format!("COACHLINE_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            None => fc.backend.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(crate::Error::Config(
                "request timeout must be at least 1 second".to_string(),
            ));
        }

        let export_dir = env("COACHLINE_EXPORT_DIR")
            .or(fc.export.dir)
            .map_or_else(|| PathBuf::from("."), PathBuf::from);

        Ok(Self {
            variant,
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            export_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_configured() {
        let config = Config::resolve(CoachlineConfigFile::default(), env_from(&[])).unwrap();

        assert_eq!(config.variant, Variant::Strategy);
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.export_dir, PathBuf::from("."));
    }

    #[test]
    fn env_overrides_file() {
        let fc = file::parse_config(
            "variant = \"strategy\"\n[backend]\nurl = \"http://file:1\"\ntimeout_secs = 5",
        )
        .unwrap();
        let config = Config::resolve(
            fc,
            env_from(&[
                ("COACHLINE_VARIANT", "nutrition"),
                ("COACHLINE_API_URL", "http://env:2"),
            ]),
        )
        .unwrap();

        assert_eq!(config.variant, Variant::Nutrition);
        assert_eq!(config.api_url, "http://env:2");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_values() {
        let bad_variant = Config::resolve(
            CoachlineConfigFile::default(),
            env_from(&[("COACHLINE_VARIANT", "fitness")]),
        );
        assert!(bad_variant.is_err());

        let zero_timeout = Config::resolve(
            CoachlineConfigFile::default(),
            env_from(&[("COACHLINE_TIMEOUT_SECS", "0")]),
        );
        assert!(zero_timeout.is_err());
    }
}
