use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::Display;

/// Environment variable holding the backend base address
pub const API_URL_ENV: &str = "VERSECHAT_API_URL";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base address of the chat backend (`{api_url}/api/chat`)
    pub api_url: Option<String>,

    /// HTTP timeout for a single chat request
    pub request_timeout_secs: u64,

    /// UI preferences
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    pub subtitle: String,
    pub placeholder: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: None,
            request_timeout_secs: 60,
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            title: "From Behind a Young Man's Chest".to_string(),
            subtitle: "Powered by AI".to_string(),
            placeholder: "Ask about your poetry book...".to_string(),
        }
    }
}

/// Where the effective backend address came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ApiUrlSource {
    #[strum(serialize = "--api-url flag")]
    Flag,
    #[strum(serialize = "VERSECHAT_API_URL")]
    Environment,
    #[strum(serialize = "config file")]
    File,
}

impl Config {
    /// Home directory for versechat state (`~/.versechat`)
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".versechat"))
    }

    /// Default location of the config file
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Load configuration from `path`, or defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply flag and environment overrides to the backend address.
    ///
    /// Precedence: flag, then environment, then file. Blank values count as unset.
    pub fn resolve_api_url(
        &mut self,
        flag: Option<String>,
        env: Option<String>,
    ) -> Option<ApiUrlSource> {
        let file = self.api_url.take();
        let candidates = [
            (flag, ApiUrlSource::Flag),
            (env, ApiUrlSource::Environment),
            (file, ApiUrlSource::File),
        ];

        for (value, source) in candidates {
            if let Some(url) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                self.api_url = Some(url);
                return Some(source);
            }
        }
        None
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(&dir.path().join("config.toml")).expect("load");
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, None);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_url = \"http://localhost:5000\"\n[ui]\ntitle = \"Verses\"\n")
            .expect("write");

        let config = Config::load(&path).expect("load");
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:5000"));
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.ui.title, "Verses");
        assert_eq!(config.ui.placeholder, UiConfig::default().placeholder);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_url = [").expect("write");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn api_url_precedence_is_flag_env_file() {
        let mut config = Config {
            api_url: Some("http://file".to_string()),
            ..Config::default()
        };
        let source = config.resolve_api_url(Some("http://flag".into()), Some("http://env".into()));
        assert_eq!(source, Some(ApiUrlSource::Flag));
        assert_eq!(config.api_url.as_deref(), Some("http://flag"));

        let mut config = Config {
            api_url: Some("http://file".to_string()),
            ..Config::default()
        };
        let source = config.resolve_api_url(Some("  ".into()), Some("http://env".into()));
        assert_eq!(source, Some(ApiUrlSource::Environment));
        assert_eq!(config.api_url.as_deref(), Some("http://env"));

        let mut config = Config {
            api_url: Some("http://file".to_string()),
            ..Config::default()
        };
        assert_eq!(config.resolve_api_url(None, None), Some(ApiUrlSource::File));
    }

    #[test]
    fn blank_everywhere_means_unconfigured() {
        let mut config = Config {
            api_url: Some(String::new()),
            ..Config::default()
        };
        assert_eq!(config.resolve_api_url(None, Some(" ".into())), None);
        assert_eq!(config.api_url, None);
    }
}
