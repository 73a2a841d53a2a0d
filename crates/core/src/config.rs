//! Sync configuration
//!
//! Everything the watcher and the remote client need to know is carried
//! in one `SyncConfig` value, loaded from `config.toml` under the platform
//! config directory and overridable per invocation.

use crate::record::file_extension;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default debounce quiet period
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(5);

/// Default remote service base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.devwilson.dev";

const MIN_QUIET_PERIOD: Duration = Duration::from_millis(100);
const MAX_QUIET_PERIOD: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Configuration shared by every sync component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Extensions (with leading dot) eligible for upload
    pub supported_extensions: Vec<String>,

    /// Inactivity required before a debounced flush fires
    #[serde(rename = "quiet_period_ms", with = "duration_ms")]
    pub quiet_period: Duration,

    /// Ignore rules that apply even without a project ignore-file
    pub builtin_ignores: Vec<String>,

    /// Name of the project ignore-file at the watched root
    pub ignore_file: String,

    /// Files larger than this are skipped (None = no cap)
    pub max_file_bytes: Option<u64>,

    /// Skip files whose leading bytes contain NUL
    pub skip_binary: bool,

    /// Capacity of the queue between the notify callback and the watch loop
    pub event_buffer: usize,

    /// Base URL of the remote indexing service
    pub api_base_url: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            supported_extensions: [
                ".jsx", ".tsx", ".json", ".html", ".css", ".md", ".yml", ".yaml", ".scss",
                ".svelte", ".vue", ".py", ".go", ".c", ".rs", ".rb", ".zig", ".php",
            ]
            .iter()
            .map(|ext| ext.to_string())
            .collect(),
            quiet_period: DEFAULT_QUIET_PERIOD,
            builtin_ignores: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "package-lock.json".to_string(),
            ],
            ignore_file: ".gitignore".to_string(),
            max_file_bytes: Some(2 * 1024 * 1024),
            skip_binary: true,
            event_buffer: 1024,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl SyncConfig {
    /// Check whether a path's extension is in the allow-list
    pub fn is_supported(&self, path: &Path) -> bool {
        let ext = file_extension(path);
        !ext.is_empty() && self.supported_extensions.iter().any(|e| *e == ext)
    }

    /// Override the quiet period
    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Validate value ranges
    pub fn validate(&self) -> Result<()> {
        if self.quiet_period < MIN_QUIET_PERIOD || self.quiet_period > MAX_QUIET_PERIOD {
            return Err(ConfigError::Invalid {
                key: "quiet_period_ms",
                reason: format!(
                    "must be between {} and {} ms",
                    MIN_QUIET_PERIOD.as_millis(),
                    MAX_QUIET_PERIOD.as_millis()
                ),
            });
        }

        if self.supported_extensions.is_empty() {
            return Err(ConfigError::Invalid {
                key: "supported_extensions",
                reason: "at least one extension is required".to_string(),
            });
        }

        if let Some(bad) = self.supported_extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(ConfigError::Invalid {
                key: "supported_extensions",
                reason: format!("'{bad}' must start with '.'"),
            });
        }

        if self.ignore_file.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "ignore_file",
                reason: "must not be empty".to_string(),
            });
        }

        if self.event_buffer == 0 {
            return Err(ConfigError::Invalid {
                key: "event_buffer",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Load configuration from a TOML file
    ///
    /// A missing file yields the defaults; keys absent from the file keep
    /// their default values.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write configuration to a TOML file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let text = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Location of the user config file
///
/// Returns `None` when the platform has no config directory.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("driftsync").join("config.toml"))
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = SyncConfig::default();
        config.validate().unwrap();
        assert_eq!(config.quiet_period, Duration::from_secs(5));
        assert!(config.builtin_ignores.contains(&".git".to_string()));
        assert!(config.builtin_ignores.contains(&"node_modules".to_string()));
        assert!(config.builtin_ignores.contains(&"package-lock.json".to_string()));
    }

    #[test]
    fn test_is_supported() {
        let config = SyncConfig::default();
        assert!(config.is_supported(Path::new("/repo/a.go")));
        assert!(config.is_supported(Path::new("web/App.tsx")));
        assert!(!config.is_supported(Path::new("/repo/a.png")));
        assert!(!config.is_supported(Path::new("/repo/Makefile")));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = SyncConfig::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "quiet_period_ms = 1500\n").unwrap();

        let config = SyncConfig::load_from(&path).unwrap();
        assert_eq!(config.quiet_period, Duration::from_millis(1500));
        assert_eq!(config.ignore_file, ".gitignore");
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = SyncConfig {
            supported_extensions: vec![".rs".to_string()],
            ..SyncConfig::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(SyncConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = SyncConfig::default().with_quiet_period(Duration::from_millis(10));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "quiet_period_ms", .. })
        ));

        let config = SyncConfig {
            supported_extensions: vec!["rs".to_string()],
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SyncConfig {
            event_buffer: 0,
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "quiet_period_ms = \"soon\"\n").unwrap();

        assert!(matches!(
            SyncConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
