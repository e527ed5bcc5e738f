//! Client configuration, stored as RON next to the working directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use queuedeck_engine::{ApiSettings, AtomicFileWriter, Credentials, SyncSettings, WatchSettings};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "queuedeck.ron";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_root: String,
    pub api_token: Option<String>,
    pub session_token: Option<String>,
    pub poll_interval_ms: u64,
    pub watch_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub default_format: String,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_root: "http://localhost:8123/api/".to_string(),
            api_token: None,
            session_token: None,
            poll_interval_ms: 1000,
            watch_interval_ms: 1000,
            request_timeout_ms: 10_000,
            connect_timeout_ms: 5000,
            default_format: "mp3".to_string(),
            log_dir: PathBuf::from("task_logs"),
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |token: &Option<String>| token.as_ref().map(|_| "<redacted>");
        f.debug_struct("AppConfig")
            .field("api_root", &self.api_root)
            .field("api_token", &redact(&self.api_token))
            .field("session_token", &redact(&self.session_token))
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("watch_interval_ms", &self.watch_interval_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("default_format", &self.default_format)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_root: Option<String>,
    pub api_token: Option<String>,
    pub session_token: Option<String>,
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        ron::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(root) = overrides.api_root {
            self.api_root = root;
        }
        if let Some(token) = overrides.api_token {
            self.api_token = Some(token);
        }
        if let Some(token) = overrides.session_token {
            self.session_token = Some(token);
        }
    }

    pub fn to_ron(&self) -> Result<String> {
        let pretty = ron::ser::PrettyConfig::new();
        ron::ser::to_string_pretty(self, pretty).context("failed to serialize config")
    }

    /// No credentials are sent until an API token is configured.
    pub fn credentials(&self) -> Option<Credentials> {
        self.api_token.as_ref().map(|api_token| {
            Credentials::new(
                api_token.clone(),
                self.session_token.clone().unwrap_or_default(),
            )
        })
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            root: self.api_root.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn watch_settings(&self) -> WatchSettings {
        WatchSettings {
            interval: Duration::from_millis(self.watch_interval_ms),
        }
    }
}

/// Writes the default config to `path`, refusing to clobber an existing file
/// unless `force` is set.
pub fn write_default(path: &Path, force: bool) -> Result<PathBuf> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
        bail!("{} is not a file path", path.display());
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let content = AppConfig::default().to_ron()?;
    AtomicFileWriter::new(dir)
        .write(filename, content.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.credentials().is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("queuedeck.ron");
        fs::write(
            &path,
            r#"(api_root: "http://nas:8123/api/", api_token: Some("k"), poll_interval_ms: 250)"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.api_root, "http://nas:8123/api/");
        assert_eq!(config.sync_settings().interval, Duration::from_millis(250));
        assert_eq!(config.default_format, "mp3");
        assert_eq!(
            config.credentials(),
            Some(Credentials::new("k", ""))
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("queuedeck.ron");
        fs::write(&path, "(poll_interval_ms: \"soon\")").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = AppConfig {
            api_token: Some("file".into()),
            ..AppConfig::default()
        };
        config.apply(Overrides {
            api_root: Some("http://other/api".into()),
            api_token: Some("flag".into()),
            session_token: None,
        });
        assert_eq!(config.api_root, "http://other/api");
        assert_eq!(config.api_token.as_deref(), Some("flag"));
        assert_eq!(config.session_token, None);
    }

    #[test]
    fn init_writes_defaults_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("queuedeck.ron");
        write_default(&path, false).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
        assert!(write_default(&path, false).is_err());
        assert!(write_default(&path, true).is_ok());
    }

    #[test]
    fn debug_output_hides_tokens() {
        let config = AppConfig {
            api_token: Some("secret-key".into()),
            session_token: Some("secret-session".into()),
            ..AppConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
    }
}
