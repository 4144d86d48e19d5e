//! Configuration management for quill.
//!
//! Loads configuration from ${QUILL_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the blogging service API.
    pub base_url: String,

    /// Timeout for HTTP requests in seconds (0 disables).
    pub request_timeout_secs: u32,
}

impl Config {
    const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
    const DEFAULT_TIMEOUT_SECS: u32 = 30;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Saves only the `base_url` field to the config file.
    ///
    /// Creates the file if it doesn't exist.
    /// Preserves existing fields and comments using `toml_edit`.
    pub fn save_base_url(base_url: &str) -> Result<()> {
        Self::save_base_url_to(&paths::config_path(), base_url)
    }

    /// Saves only the `base_url` field to a specific config file path.
    pub fn save_base_url_to(path: &Path, base_url: &str) -> Result<()> {
        url::Url::parse(base_url).with_context(|| format!("Invalid base URL: {base_url}"))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?
        } else {
            String::new()
        };

        let mut doc = contents
            .parse::<toml_edit::DocumentMut>()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        doc["base_url"] = toml_edit::value(base_url.trim_end_matches('/'));

        fs::write(path, doc.to_string())
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

pub mod paths {
    //! Path resolution for quill configuration and data directories.
    //!
    //! QUILL_HOME resolution order:
    //! 1. QUILL_HOME environment variable (if set)
    //! 2. ~/.config/quill (default)

    use std::path::PathBuf;

    /// Returns the quill home directory.
    ///
    /// Checks QUILL_HOME env var first, falls back to ~/.config/quill
    pub fn quill_home() -> PathBuf {
        if let Ok(home) = std::env::var("QUILL_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("quill"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        quill_home().join("config.toml")
    }

    /// Returns the path to the persisted credential slot.
    pub fn credentials_path() -> PathBuf {
        quill_home().join("credentials.json")
    }

    /// Returns the directory for log files.
    pub fn logs_dir() -> PathBuf {
        quill_home().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.base_url, Config::DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout_secs, Config::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"https://blog.example.com\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "https://blog.example.com");
        assert_eq!(config.request_timeout_secs, Config::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn save_base_url_preserves_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "# local instance\nbase_url = \"http://127.0.0.1:8000\"\nrequest_timeout_secs = 10\n",
        )
        .unwrap();

        Config::save_base_url_to(&path, "https://blog.example.com").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("# local instance"));
        assert!(contents.contains("request_timeout_secs = 10"));

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "https://blog.example.com");
    }

    #[test]
    fn quill_home_resolution_order() {
        // Env override wins; without it the home-directory fallback
        // applies. One test so the two cases cannot race each other.
        unsafe {
            std::env::remove_var("QUILL_HOME");
        }
        assert!(paths::quill_home().ends_with(".config/quill"));

        let dir = tempfile::tempdir().unwrap();
        unsafe {
            std::env::set_var("QUILL_HOME", dir.path());
        }
        assert_eq!(paths::quill_home(), dir.path());
        unsafe {
            std::env::remove_var("QUILL_HOME");
        }
    }

    #[test]
    fn save_base_url_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(Config::save_base_url_to(&path, "not a url").is_err());
    }
}
