//! Validation and normalization of merged settings.

use super::registry::{DEFAULT_ADMIN, names};
use super::resolved::ResolvedConfig;
use super::sources::{ConfigTier, Merged};
use super::value::SettingValue;
use crate::error::{ConfigError, ConfigResult};
use crate::paths::absolutize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Turns merged settings into a [`ResolvedConfig`].
///
/// Relative paths are resolved against `working_dir`, which is injected so
/// the process-wide current directory is read only once, at startup.
#[derive(Debug, Clone)]
pub struct Validator {
    working_dir: PathBuf,
}

impl Validator {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Validator anchored at the process's current working directory.
    pub fn from_current_dir() -> ConfigResult<Self> {
        std::env::current_dir()
            .map(Self::new)
            .map_err(ConfigError::WorkingDirUnavailable)
    }

    pub fn validate(&self, merged: &Merged) -> ConfigResult<ResolvedConfig> {
        let gopherroot = self.content_root(path(merged, names::GOPHERROOT)?)?;
        let port = check_port(integer(merged, names::PORT)?)?;
        let address = parse_address(string(merged, names::ADDRESS)?)?;
        let selector_limit = check_selector_limit(integer(merged, names::SELECTOR_LIMIT)?)?;
        let selector_timeout = check_selector_timeout(duration(merged, names::SELECTOR_TIMEOUT)?)?;
        let test_mode = boolean(merged, names::TESTMODE)?;
        let admin = string(merged, names::ADMIN)?.to_string();

        if admin == DEFAULT_ADMIN && merged.source_of(names::ADMIN) == Some(ConfigTier::Defaults) {
            warn!(admin = %admin, "Admin contact is the placeholder default; set 'admin' to a real address");
        }

        Ok(ResolvedConfig {
            gopherroot,
            port,
            address,
            test_mode,
            selector_limit,
            selector_timeout,
            admin,
            config_file: merged.config_file().map(Path::to_path_buf),
            provenance: merged.provenance(),
        })
    }

    /// Make the content root absolute and check that it is a readable directory.
    fn content_root(&self, raw: &Path) -> ConfigResult<PathBuf> {
        let root = absolutize(raw, &self.working_dir);
        if root != raw {
            debug!(from = %raw.display(), to = %root.display(), "Expanded gopherroot");
        }

        let metadata = std::fs::metadata(&root).map_err(|source| {
            ConfigError::ContentRootInaccessible {
                path: root.clone(),
                source,
            }
        })?;
        if !metadata.is_dir() {
            return Err(ConfigError::ContentRootNotDirectory { path: root });
        }
        std::fs::read_dir(&root).map_err(|source| ConfigError::ContentRootUnreadable {
            path: root.clone(),
            source,
        })?;

        Ok(root)
    }
}

fn check_port(port: i64) -> ConfigResult<u16> {
    u16::try_from(port)
        .ok()
        .filter(|port| *port != 0)
        .ok_or(ConfigError::OutOfRange {
            setting: names::PORT,
            value: port.to_string(),
            reason: "must be between 1 and 65535",
        })
}

fn check_selector_limit(limit: i64) -> ConfigResult<usize> {
    usize::try_from(limit)
        .ok()
        .filter(|limit| *limit > 0)
        .ok_or(ConfigError::OutOfRange {
            setting: names::SELECTOR_LIMIT,
            value: limit.to_string(),
            reason: "must be a positive number of bytes",
        })
}

fn check_selector_timeout(timeout: Duration) -> ConfigResult<Duration> {
    if timeout.is_zero() {
        return Err(ConfigError::OutOfRange {
            setting: names::SELECTOR_TIMEOUT,
            value: humantime::format_duration(timeout).to_string(),
            reason: "must be longer than zero",
        });
    }
    Ok(timeout)
}

fn parse_address(raw: &str) -> ConfigResult<IpAddr> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidAddress {
            value: raw.to_string(),
        })
}

// Typed accessors over the string-keyed merge result. A missing or
// mistyped entry means the registry and this module disagree.

fn entry<'m>(merged: &'m Merged, name: &'static str) -> ConfigResult<&'m SettingValue> {
    merged.get(name).ok_or(ConfigError::MissingValue(name))
}

fn path<'m>(merged: &'m Merged, name: &'static str) -> ConfigResult<&'m Path> {
    entry(merged, name)?
        .as_path()
        .ok_or(ConfigError::MissingValue(name))
}

fn string<'m>(merged: &'m Merged, name: &'static str) -> ConfigResult<&'m str> {
    entry(merged, name)?
        .as_str()
        .ok_or(ConfigError::MissingValue(name))
}

fn integer(merged: &Merged, name: &'static str) -> ConfigResult<i64> {
    entry(merged, name)?
        .as_integer()
        .ok_or(ConfigError::MissingValue(name))
}

fn boolean(merged: &Merged, name: &'static str) -> ConfigResult<bool> {
    entry(merged, name)?
        .as_bool()
        .ok_or(ConfigError::MissingValue(name))
}

fn duration(merged: &Merged, name: &'static str) -> ConfigResult<Duration> {
    entry(merged, name)?
        .as_duration()
        .ok_or(ConfigError::MissingValue(name))
}
