//! Config file discovery and loading.
//!
//! An explicitly named file is used as-is. Otherwise `yagopherd.<ext>` is
//! probed in the working directory, the per-user config directory and the
//! system-wide config directory, in that order; the first match wins.

use super::registry::APP_NAME;
use crate::error::{ConfigError, ConfigResult};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Vendor directory under the platform config directories. Per-user and
/// system config live in `<config dir>/<vendor>/<app>`.
const VENDOR_NAME: &str = "yagopherd";

/// Supported config file extensions, in probe order.
pub const CONFIG_EXTENSIONS: &[&str] = &["json", "toml", "yaml", "yml"];

/// Config file format, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format of a path from its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            _ => None,
        }
    }

    /// Parse file contents into a generic document.
    fn parse(self, content: &str) -> Result<Value, String> {
        match self {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str::<toml::Table>(content)
                .map_err(|e| e.to_string())
                .and_then(|table| serde_json::to_value(table).map_err(|e| e.to_string())),
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigFormat::Json => write!(f, "json"),
            ConfigFormat::Toml => write!(f, "toml"),
            ConfigFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Directories searched for a config file when none is named explicitly.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Current working directory
    pub working_dir: Option<PathBuf>,
    /// Per-user config directory
    pub user_dir: Option<PathBuf>,
    /// System-wide config directory
    pub system_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover the platform's search directories.
    pub fn discover() -> Self {
        Self {
            working_dir: Some(PathBuf::from(".")),
            user_dir: dirs::config_dir().map(|dir| app_config_dir(&dir)),
            system_dir: system_config_dir().map(|dir| app_config_dir(&dir)),
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(
        working_dir: Option<PathBuf>,
        user_dir: Option<PathBuf>,
        system_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            working_dir,
            user_dir,
            system_dir,
        }
    }

    /// Search directories in probe order.
    pub fn search_dirs(&self) -> impl Iterator<Item = &Path> {
        [&self.working_dir, &self.user_dir, &self.system_dir]
            .into_iter()
            .filter_map(|dir| dir.as_deref())
    }

    /// Find the first `yagopherd.<ext>` file in the search directories.
    pub fn find_config_file(&self) -> Option<PathBuf> {
        for dir in self.search_dirs() {
            for ext in CONFIG_EXTENSIONS {
                let candidate = dir.join(format!("{}.{}", APP_NAME, ext));
                debug!(path = %candidate.display(), "Probing for config file");
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

fn app_config_dir(base: &Path) -> PathBuf {
    base.join(VENDOR_NAME).join(APP_NAME)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn system_config_dir() -> Option<PathBuf> {
    let from_env = std::env::var_os("XDG_CONFIG_DIRS")
        .and_then(|dirs| std::env::split_paths(&dirs).find(|dir| dir.is_absolute()));
    Some(from_env.unwrap_or_else(|| PathBuf::from("/etc/xdg")))
}

#[cfg(target_os = "macos")]
fn system_config_dir() -> Option<PathBuf> {
    Some(PathBuf::from("/Library/Application Support"))
}

#[cfg(windows)]
fn system_config_dir() -> Option<PathBuf> {
    std::env::var_os("PROGRAMDATA").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn system_config_dir() -> Option<PathBuf> {
    None
}

/// A config file read from disk, with keys lower-cased.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub format: ConfigFormat,
    pub entries: Map<String, Value>,
}

impl ConfigFile {
    /// Read and parse a config file. Any failure is fatal to the caller.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_error = |message: String| ConfigError::ConfigFileParse {
            path: path.to_path_buf(),
            message,
        };

        let document = format.parse(&content).map_err(parse_error)?;
        let entries = match document {
            Value::Object(map) => map,
            // An empty YAML file parses to null
            Value::Null => Map::new(),
            _ => {
                return Err(parse_error(
                    "expected a table of settings at the top level".to_string(),
                ));
            }
        };

        let mut lowered = Map::new();
        for (key, value) in entries {
            let key = key.to_lowercase();
            if lowered.contains_key(&key) {
                return Err(parse_error(format!(
                    "key '{}' appears more than once (keys are case-insensitive)",
                    key
                )));
            }
            lowered.insert(key, value);
        }

        Ok(Self {
            path: path.to_path_buf(),
            format,
            entries: lowered,
        })
    }
}
