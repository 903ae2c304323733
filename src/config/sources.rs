//! Source layers and precedence merging.
//!
//! Each source contributes a [`Layer`] of typed values keyed by setting name.
//! Layers are merged setting-by-setting; the highest tier holding a value
//! wins and is recorded as that setting's provenance.

use super::loader::{ConfigFile, ConfigPaths};
use super::registry::{Registry, names};
use super::value::SettingValue;
use crate::error::{ConfigError, ConfigResult};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration source priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigTier {
    /// Registry defaults (lowest priority)
    Defaults = 0,
    /// Discovered or explicitly named config file
    File = 1,
    /// `YAGOPHERD_*` environment variables
    Environment = 2,
    /// Flags passed on this invocation (highest priority)
    CommandLine = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::File => write!(f, "config file"),
            ConfigTier::Environment => write!(f, "environment"),
            ConfigTier::CommandLine => write!(f, "command line"),
        }
    }
}

/// Values contributed by one source.
#[derive(Debug, Clone)]
pub struct Layer {
    pub tier: ConfigTier,
    values: BTreeMap<&'static str, SettingValue>,
}

impl Layer {
    pub fn new(tier: ConfigTier) -> Self {
        Self {
            tier,
            values: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, name: &'static str, value: SettingValue) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Layer holding every registry default.
    pub fn defaults(registry: &Registry) -> Self {
        let mut layer = Self::new(ConfigTier::Defaults);
        for spec in registry.iter() {
            if let Some(default) = &spec.default {
                layer.set(spec.name, default.clone());
            }
        }
        layer
    }

    /// Layer from `YAGOPHERD_<NAME>` variables. Empty values count as unset.
    pub fn from_env<I, K, V>(registry: &Registry, vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let vars: BTreeMap<OsString, OsString> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut layer = Self::new(ConfigTier::Environment);
        for spec in registry.iter() {
            let Some(raw) = vars.get(&OsString::from(spec.env_var())) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            let raw = raw.to_string_lossy();
            let value = spec
                .kind
                .parse_str(&raw)
                .map_err(|reason| ConfigError::InvalidValue {
                    setting: spec.name.to_string(),
                    tier: ConfigTier::Environment,
                    value: raw.to_string(),
                    reason,
                })?;
            debug!(setting = spec.name, var = %spec.env_var(), "Setting from environment");
            layer.set(spec.name, value);
        }
        Ok(layer)
    }

    /// Layer from a loaded config file. Unknown keys are ignored with a warning.
    pub fn from_file(registry: &Registry, file: &ConfigFile) -> ConfigResult<Self> {
        let mut layer = Self::new(ConfigTier::File);
        for (key, raw) in &file.entries {
            let Some(spec) = registry.get(key) else {
                warn!(key = %key, path = %file.path.display(), "Ignoring unknown config file key");
                continue;
            };
            if spec.name == names::CONFIG {
                warn!(path = %file.path.display(), "Config files cannot name another config file; ignoring 'config' key");
                continue;
            }
            if raw.is_null() {
                continue;
            }
            let value = spec
                .kind
                .from_document(raw)
                .map_err(|reason| ConfigError::InvalidValue {
                    setting: spec.name.to_string(),
                    tier: ConfigTier::File,
                    value: raw.to_string(),
                    reason,
                })?;
            layer.set(spec.name, value);
        }
        Ok(layer)
    }
}

/// Settings merged across all layers, with the tier each value came from.
#[derive(Debug, Clone)]
pub struct Merged {
    entries: BTreeMap<&'static str, (SettingValue, ConfigTier)>,
    config_file: Option<PathBuf>,
}

impl Merged {
    /// Merge layers; for each setting the highest tier wins.
    pub fn from_layers(registry: &Registry, layers: &[Layer]) -> Self {
        let mut ordered: Vec<&Layer> = layers.iter().collect();
        ordered.sort_by_key(|layer| std::cmp::Reverse(layer.tier));

        let mut entries = BTreeMap::new();
        for spec in registry.iter() {
            let winner = ordered
                .iter()
                .find_map(|layer| layer.get(spec.name).map(|value| (value.clone(), layer.tier)));
            if let Some(entry) = winner {
                entries.insert(spec.name, entry);
            }
        }

        Self {
            entries,
            config_file: None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.entries.get(name).map(|(value, _)| value)
    }

    /// The tier that supplied a setting's value.
    pub fn source_of(&self, name: &str) -> Option<ConfigTier> {
        self.entries.get(name).map(|(_, tier)| *tier)
    }

    /// Config file that contributed to this merge, if any.
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    pub(crate) fn provenance(&self) -> BTreeMap<&'static str, ConfigTier> {
        self.entries
            .iter()
            .map(|(name, (_, tier))| (*name, *tier))
            .collect()
    }
}

/// Merges CLI, environment, config file and defaults with fixed precedence.
#[derive(Debug, Clone)]
pub struct SourceResolver<'a> {
    registry: &'a Registry,
    paths: ConfigPaths,
}

impl<'a> SourceResolver<'a> {
    pub fn with_paths(registry: &'a Registry, paths: ConfigPaths) -> Self {
        Self { registry, paths }
    }

    /// Resolve the config file to use, if any.
    ///
    /// An explicit path (CLI, then environment) is loaded unconditionally and
    /// the search path is never consulted. Otherwise the first file found in
    /// the search directories is loaded. Finding nothing is not an error.
    /// An empty path (`-c ""`) counts as not given.
    pub fn load_config_file(
        &self,
        cli: &Layer,
        env: &Layer,
    ) -> ConfigResult<Option<ConfigFile>> {
        let explicit = [cli, env]
            .into_iter()
            .find_map(|layer| {
                layer
                    .get(names::CONFIG)
                    .and_then(SettingValue::as_path)
                    .filter(|path| !path.as_os_str().is_empty())
            });

        if let Some(path) = explicit {
            info!(path = %path.display(), "Using explicitly named config file");
            return ConfigFile::load(path).map(Some);
        }

        match self.paths.find_config_file() {
            Some(path) => {
                info!(path = %path.display(), "Using config file");
                ConfigFile::load(&path).map(Some)
            }
            None => {
                info!("No config file found, relying on env vars/flags/defaults");
                Ok(None)
            }
        }
    }

    /// Produce the merged settings from the given CLI and environment layers.
    pub fn resolve(&self, cli: Layer, env: Layer) -> ConfigResult<Merged> {
        let file = self.load_config_file(&cli, &env)?;

        let mut layers = vec![Layer::defaults(self.registry)];
        if let Some(file) = &file {
            let layer = Layer::from_file(self.registry, file)?;
            debug!(path = %file.path.display(), format = %file.format, settings = layer.len(), "Loaded config file");
            layers.push(layer);
        }
        layers.push(env);
        layers.push(cli);

        let mut merged = Merged::from_layers(self.registry, &layers);
        merged.config_file = file.map(|file| file.path);
        Ok(merged)
    }
}
