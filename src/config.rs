//! `protolink.toml` configuration
//!
//! ```toml
//! [library]
//! path = "/opt/protolink/libprotolink.so"   # wins over name/search_paths
//! name = "protolink"
//! search_paths = ["./target/release"]
//!
//! [logging]
//! level = "debug"
//! json = false
//! file = "protolink.log"
//! spans = false
//! ```

use crate::logging::{self, LogConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment override for the library location
pub const LIBRARY_ENV: &str = "PROTOLINK_LIBRARY";

/// Default configuration file name
pub const CONFIG_FILE: &str = "protolink.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown log level '{0}'")]
    InvalidLevel(String),

    #[error("native library '{name}' not found in {searched:?}")]
    LibraryNotFound { name: String, searched: Vec<PathBuf> },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Explicit library file
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Base name without platform prefix/extension
    #[serde(default = "default_library_name")]
    pub name: String,

    /// Directories tried in order when `path` is unset
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,

    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub spans: bool,
}

fn default_library_name() -> String {
    "protolink".to_string()
}

fn default_search_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("."),
        PathBuf::from("target/release"),
        PathBuf::from("target/debug"),
    ]
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: None,
            name: default_library_name(),
            search_paths: default_search_paths(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            file: None,
            spans: false,
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse TOML content
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `protolink.toml` from `dir` if present, defaults otherwise,
    /// then apply environment overrides.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let candidate = dir.as_ref().join(CONFIG_FILE);
        let config = if candidate.is_file() {
            Self::load(&candidate)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// `PROTOLINK_LIBRARY` replaces `library.path`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(LIBRARY_ENV) {
            self.library.path = Some(PathBuf::from(path));
        }
        self
    }
}

impl LibraryConfig {
    /// Platform file name for `name`, e.g. `libprotolink.so`
    pub fn file_name(&self) -> String {
        format!(
            "{}{}{}",
            std::env::consts::DLL_PREFIX,
            self.name,
            std::env::consts::DLL_SUFFIX
        )
    }

    /// Locate the library file: explicit path first, then each search path.
    pub fn resolve(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.path {
            return if path.is_file() {
                Ok(path.clone())
            } else {
                Err(ConfigError::LibraryNotFound {
                    name: path.display().to_string(),
                    searched: vec![path.clone()],
                })
            };
        }

        let file_name = self.file_name();
        self.search_paths
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ConfigError::LibraryNotFound {
                name: file_name,
                searched: self.search_paths.clone(),
            })
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self) -> Result<LogConfig, ConfigError> {
        let level = logging::parse_level(&self.level)
            .ok_or_else(|| ConfigError::InvalidLevel(self.level.clone()))?;
        Ok(LogConfig {
            level,
            log_path: self.file.clone(),
            json_format: self.json,
            show_spans: self.spans,
        })
    }
}
