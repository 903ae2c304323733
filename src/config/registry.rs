//! Option registry: the fixed set of recognized settings.
//!
//! Each setting's name is the lookup key across all sources: it is the CLI
//! long flag, the environment variable suffix and the config file key.

use super::value::{SettingKind, SettingValue};
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application name; also the config file stem and config directory name.
pub const APP_NAME: &str = "yagopherd";

/// Prefix for environment variables (`YAGOPHERD_PORT`, ...).
pub const ENV_PREFIX: &str = "YAGOPHERD_";

/// Setting names.
pub mod names {
    pub const GOPHERROOT: &str = "gopherroot";
    pub const PORT: &str = "port";
    pub const ADDRESS: &str = "address";
    pub const TESTMODE: &str = "testmode";
    pub const SELECTOR_LIMIT: &str = "selectorlimit";
    pub const SELECTOR_TIMEOUT: &str = "selectortimeout";
    pub const ADMIN: &str = "admin";
    pub const CONFIG: &str = "config";
}

pub const DEFAULT_PORT: i64 = 70;
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_SELECTOR_LIMIT: i64 = 8192;
pub const DEFAULT_SELECTOR_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_ADMIN: &str = "fakeadmin@fakegopherhole.example.com";

/// Content root directory name under the user's home directory.
pub const DEFAULT_GOPHERROOT_DIR: &str = ".gopher";

/// Declaration of a single setting.
#[derive(Debug, Clone)]
pub struct SettingSpec {
    pub name: &'static str,
    pub kind: SettingKind,
    /// `None` only for settings whose absence is meaningful (`config`).
    pub default: Option<SettingValue>,
    pub short_flag: Option<char>,
    /// Whether the setting is exposed as a CLI flag.
    pub cli_flag: bool,
    pub help: &'static str,
}

impl SettingSpec {
    pub fn new(name: &'static str, kind: SettingKind, help: &'static str) -> Self {
        Self {
            name,
            kind,
            default: None,
            short_flag: None,
            cli_flag: true,
            help,
        }
    }

    pub fn with_default(mut self, value: SettingValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_short(mut self, flag: char) -> Self {
        self.short_flag = Some(flag);
        self
    }

    /// Settable only through the environment or a config file.
    pub fn without_flag(mut self) -> Self {
        self.cli_flag = false;
        self.short_flag = None;
        self
    }

    /// Environment variable bound to this setting.
    pub fn env_var(&self) -> String {
        format!("{}{}", ENV_PREFIX, self.name.to_uppercase())
    }
}

/// The complete, immutable set of settings.
#[derive(Debug, Clone)]
pub struct Registry {
    settings: Vec<SettingSpec>,
}

impl Registry {
    /// Build a registry, checking that names are non-empty and unique,
    /// short flags are unique, and defaults match their declared kind.
    pub fn new(settings: Vec<SettingSpec>) -> ConfigResult<Self> {
        let mut seen_names: HashMap<String, &str> = HashMap::new();
        let mut seen_shorts: HashMap<char, &str> = HashMap::new();

        for spec in &settings {
            if spec.name.trim().is_empty() {
                return Err(ConfigError::EmptySettingName);
            }
            // File keys are case-insensitive, so names must be too
            if seen_names
                .insert(spec.name.to_lowercase(), spec.name)
                .is_some()
            {
                return Err(ConfigError::DuplicateSetting(spec.name.to_string()));
            }
            if let Some(flag) = spec.short_flag
                && let Some(first) = seen_shorts.insert(flag, spec.name)
            {
                return Err(ConfigError::DuplicateShortFlag {
                    flag,
                    first: first.to_string(),
                    second: spec.name.to_string(),
                });
            }
            if let Some(default) = &spec.default
                && default.kind() != spec.kind
            {
                return Err(ConfigError::DefaultKindMismatch {
                    name: spec.name.to_string(),
                    declared: spec.kind.to_string(),
                    actual: default.kind().to_string(),
                });
            }
        }

        Ok(Self { settings })
    }

    /// The standard yagopherd settings, with the content root defaulting to
    /// `<home>/.gopher`.
    pub fn standard(home: &Path) -> ConfigResult<Self> {
        let settings = vec![
            SettingSpec::new(
                names::GOPHERROOT,
                SettingKind::Path,
                "Path to the directory to be served.",
            )
            .with_short('g')
            .with_default(SettingValue::Path(home.join(DEFAULT_GOPHERROOT_DIR))),
            SettingSpec::new(
                names::PORT,
                SettingKind::Integer,
                "The port to listen on. Default requires root/admin privileges.",
            )
            .with_short('p')
            .with_default(SettingValue::Integer(DEFAULT_PORT)),
            SettingSpec::new(
                names::ADDRESS,
                SettingKind::String,
                "An IPv4/v6 address to listen on. Multiple addresses are currently unsupported.",
            )
            .with_short('a')
            .with_default(SettingValue::String(DEFAULT_ADDRESS.to_string())),
            SettingSpec::new(
                names::TESTMODE,
                SettingKind::Boolean,
                "Run in test mode.",
            )
            .without_flag()
            .with_default(SettingValue::Boolean(false)),
            SettingSpec::new(
                names::SELECTOR_LIMIT,
                SettingKind::Integer,
                "How many bytes the client can send in the selector. Don't set this too high \
                 or clients might be able to DoS the server by exhausting memory.",
            )
            .with_short('l')
            .with_default(SettingValue::Integer(DEFAULT_SELECTOR_LIMIT)),
            SettingSpec::new(
                names::SELECTOR_TIMEOUT,
                SettingKind::Duration,
                "How long to wait from a client connecting to finishing sending its selector, \
                 e.g. 5s or 1m30s (a plain number is seconds, not nanoseconds). Don't set this \
                 too high or clients might be able to DoS the server with a \"slowloris-style\" \
                 attack.",
            )
            .with_short('t')
            .with_default(SettingValue::Duration(DEFAULT_SELECTOR_TIMEOUT)),
            SettingSpec::new(
                names::ADMIN,
                SettingKind::String,
                "The E-mail address of the server admin. Displayed to clients in error \
                 messages and the ADMIN: field of gopher+ items.",
            )
            .with_short('m')
            .with_default(SettingValue::String(DEFAULT_ADMIN.to_string())),
            SettingSpec::new(
                names::CONFIG,
                SettingKind::Path,
                "Path to configuration file outside the standard config directories.",
            )
            .with_short('c'),
        ];

        Self::new(settings)
    }

    /// Standard settings rooted at the current user's home directory.
    pub fn discover() -> ConfigResult<Self> {
        let home: PathBuf = dirs::home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
        Self::standard(&home)
    }

    pub fn settings(&self) -> &[SettingSpec] {
        &self.settings
    }

    /// Look up a setting by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&SettingSpec> {
        self.settings
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SettingSpec> {
        self.settings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> Registry {
        Registry::standard(Path::new("/home/gopher")).unwrap()
    }

    #[test]
    fn test_standard_registry_passes_checks() {
        let registry = Registry::standard(Path::new("/home/gopher"));
        assert_eq!(registry.unwrap().settings().len(), 8);
    }

    #[test]
    fn test_standard_defaults() {
        let registry = standard();
        let default = |name: &str| registry.get(name).unwrap().default.clone();

        assert_eq!(
            default(names::GOPHERROOT),
            Some(SettingValue::Path(PathBuf::from("/home/gopher/.gopher")))
        );
        assert_eq!(default(names::PORT), Some(SettingValue::Integer(70)));
        assert_eq!(
            default(names::ADDRESS),
            Some(SettingValue::String("0.0.0.0".into()))
        );
        assert_eq!(default(names::TESTMODE), Some(SettingValue::Boolean(false)));
        assert_eq!(
            default(names::SELECTOR_LIMIT),
            Some(SettingValue::Integer(8192))
        );
        assert_eq!(
            default(names::SELECTOR_TIMEOUT),
            Some(SettingValue::Duration(Duration::from_secs(5)))
        );
        assert_eq!(
            default(names::ADMIN),
            Some(SettingValue::String(
                "fakeadmin@fakegopherhole.example.com".into()
            ))
        );
        assert_eq!(default(names::CONFIG), None);
    }

    #[test]
    fn test_testmode_has_no_flag() {
        let registry = standard();
        let spec = registry.get(names::TESTMODE).unwrap();
        assert!(!spec.cli_flag);
        assert_eq!(spec.short_flag, None);
    }

    #[test]
    fn test_env_var_names() {
        let registry = standard();
        assert_eq!(
            registry.get(names::PORT).unwrap().env_var(),
            "YAGOPHERD_PORT"
        );
        assert_eq!(
            registry.get(names::SELECTOR_TIMEOUT).unwrap().env_var(),
            "YAGOPHERD_SELECTORTIMEOUT"
        );
    }

    #[test]
    fn test_lookup_ignores_case() {
        let registry = standard();
        assert_eq!(registry.get("GopherRoot").unwrap().name, names::GOPHERROOT);
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_rejects_empty_name() {
        let result = Registry::new(vec![SettingSpec::new("", SettingKind::String, "")]);
        assert!(matches!(result, Err(ConfigError::EmptySettingName)));
    }

    #[test]
    fn test_rejects_duplicate_names_case_insensitively() {
        let result = Registry::new(vec![
            SettingSpec::new("port", SettingKind::Integer, ""),
            SettingSpec::new("PORT", SettingKind::Integer, ""),
        ]);
        assert!(matches!(result, Err(ConfigError::DuplicateSetting(name)) if name == "PORT"));
    }

    #[test]
    fn test_rejects_duplicate_short_flags() {
        let result = Registry::new(vec![
            SettingSpec::new("port", SettingKind::Integer, "").with_short('p'),
            SettingSpec::new("path", SettingKind::Path, "").with_short('p'),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::DuplicateShortFlag { flag: 'p', .. })
        ));
    }

    #[test]
    fn test_rejects_mistyped_default() {
        let result = Registry::new(vec![
            SettingSpec::new("port", SettingKind::Integer, "")
                .with_default(SettingValue::String("70".into())),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::DefaultKindMismatch { .. })
        ));
    }
}
