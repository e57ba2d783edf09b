//! Project configuration
//!
//! Settings come from three places, later ones winning:
//!
//! 1. built-in defaults
//! 2. `routeforge.json` in the project directory
//! 3. `ROUTEFORGE_*` environment variables, after loading `.env`
//!
//! ```json
//! {
//!   "name": "petstore",
//!   "address": "0.0.0.0:8080",
//!   "exportPath": "docs/api.json",
//!   "log": { "level": "info,routeforge=debug", "format": "json" }
//! }
//! ```
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `ROUTEFORGE_ADDRESS` | `address` |
//! | `ROUTEFORGE_EXPORT_PATH` | `exportPath` |
//! | `ROUTEFORGE_LOG_LEVEL` | `log.level` |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the project file
pub const CONFIG_FILE: &str = "routeforge.json";

/// Prefix of the environment overrides
pub const ENV_PREFIX: &str = "ROUTEFORGE_";

/// Error type for configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid environment configuration: {0}")]
    Env(#[from] envy::Error),

    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

/// Log output style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One line per event
    #[default]
    Compact,
    /// Multi-line, human oriented
    Pretty,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Contents of `routeforge.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Listen address for `serve`
    pub address: String,
    /// Output file for `export`, relative to the project directory
    pub export_path: PathBuf,
    pub log: LogConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            version: None,
            address: "127.0.0.1:8080".to_string(),
            export_path: PathBuf::from("api.json"),
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    address: Option<String>,
    export_path: Option<PathBuf>,
    log_level: Option<String>,
}

impl ProjectConfig {
    /// Load the configuration of the project in `dir`.
    ///
    /// Reads `dir/.env` (never overriding variables already set), then
    /// `dir/routeforge.json`, then applies `ROUTEFORGE_*` overrides.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        load_dotenv(&dir.join(".env"))?;
        Self::from_file(dir.join(CONFIG_FILE))?.with_env_vars(std::env::vars())
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no project file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `ROUTEFORGE_*` overrides found in `vars`
    pub fn with_env_vars<I>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let overrides: EnvOverrides = envy::prefixed(ENV_PREFIX).from_iter(vars)?;

        if let Some(address) = overrides.address {
            self.address = address;
        }
        if let Some(export_path) = overrides.export_path {
            self.export_path = export_path;
        }
        if let Some(level) = overrides.log_level {
            self.log.level = level;
        }
        Ok(self)
    }
}

fn load_dotenv(path: &Path) -> Result<(), ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!(path = %path.display(), "loaded environment file");
            Ok(())
        }
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err.into()),
    }
}
