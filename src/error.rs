//! Error types for configuration resolution.
//!
//! Every variant is fatal to startup. Not finding a config file is not an
//! error and never produces one of these.

use crate::config::ConfigTier;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while declaring, resolving or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    // Environment discovery
    #[error("Unable to determine user's home directory")]
    HomeDirUnavailable,

    #[error("Unable to determine current working directory: {0}")]
    WorkingDirUnavailable(#[source] io::Error),

    // Registry declaration
    #[error("Setting names must be non-empty")]
    EmptySettingName,

    #[error("Setting '{0}' is declared more than once")]
    DuplicateSetting(String),

    #[error("Short flag '-{flag}' is used by both '{first}' and '{second}'")]
    DuplicateShortFlag {
        flag: char,
        first: String,
        second: String,
    },

    #[error("Default for '{name}' is a {actual}, but the setting is declared as a {declared}")]
    DefaultKindMismatch {
        name: String,
        declared: String,
        actual: String,
    },

    // Config file
    #[error("Error while reading config file {}: {source}", path.display())]
    ConfigFileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error while parsing config file {}: {message}", path.display())]
    ConfigFileParse { path: PathBuf, message: String },

    #[error(
        "Unsupported config file type {} (expected one of: json, toml, yaml, yml)",
        path.display()
    )]
    UnsupportedFormat { path: PathBuf },

    // Values
    #[error("Invalid value {value:?} for '{setting}' from {tier}: {reason}")]
    InvalidValue {
        setting: String,
        tier: ConfigTier,
        value: String,
        reason: String,
    },

    #[error("Setting '{setting}' is out of range ({value}): {reason}")]
    OutOfRange {
        setting: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid listen address {value:?}: expected an IPv4 or IPv6 literal")]
    InvalidAddress { value: String },

    #[error("Setting '{0}' has no value")]
    MissingValue(&'static str),

    // Content root
    #[error("Cannot stat gopherroot {}: {source}", path.display())]
    ContentRootInaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("gopherroot {} is not a directory", path.display())]
    ContentRootNotDirectory { path: PathBuf },

    #[error("Cannot read gopherroot {}: {source}", path.display())]
    ContentRootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
