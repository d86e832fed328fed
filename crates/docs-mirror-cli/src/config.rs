use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use docs_mirror::manifest::{DEFAULT_MANIFEST_URL, DEFAULT_URL_PATTERN};
use docs_mirror::sync::DEFAULT_CONCURRENCY;
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
///
/// Relative paths are resolved against the repository root (the working
/// directory the command runs in).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub manifest_url: String,
    pub url_pattern: String,
    pub docs_dir: PathBuf,
    pub concurrency: usize,
    /// Retries per request after the first attempt.
    pub retries: u32,
    /// Seconds a single request may take before it is retried.
    pub timeout_secs: u64,
    pub strict_collisions: bool,
    pub changelog_file: PathBuf,
    pub version_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.into(),
            url_pattern: DEFAULT_URL_PATTERN.into(),
            docs_dir: PathBuf::from("docs/en"),
            concurrency: DEFAULT_CONCURRENCY,
            retries: 3,
            timeout_secs: 10,
            strict_collisions: false,
            changelog_file: PathBuf::from("CHANGELOG.md"),
            version_file: PathBuf::from("VERSION"),
        }
    }
}

/// Config file path: `~/.config/docs-mirror/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("docs-mirror").join("config.toml"))
}

/// Load config from an explicit path. Any failure is an error.
pub fn load_from(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config at {}", path.display()))
}

/// Load config from the default location, falling back to defaults if it
/// is missing or unreadable.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        if let Ok(config) = toml::from_str::<AppConfig>(&contents) {
            return config;
        }
        tracing::warn!(path = %path.display(), "failed to parse config, using defaults");
        eprintln!(
            "warning: failed to parse config at {}, using defaults",
            path.display()
        );
    }

    AppConfig::default()
}
