//! Layered configuration resolution.
//!
//! Resolves every setting from four sources, highest precedence first:
//! 1. **Command line** - flags passed on this invocation
//! 2. **Environment** - `YAGOPHERD_<NAME>` variables
//! 3. **Config file** - `--config`/`YAGOPHERD_CONFIG`, or the first
//!    `yagopherd.{json,toml,yaml,yml}` found in `.`, the per-user config dir
//!    and the system config dir
//! 4. **Defaults** - declared in the [`Registry`]
//!
//! The merged settings are then validated into a [`ResolvedConfig`], which is
//! built exactly once per process and never changes afterwards.

mod loader;
mod registry;
mod resolved;
mod sources;
mod validate;
mod value;

pub use loader::{CONFIG_EXTENSIONS, ConfigFile, ConfigFormat, ConfigPaths};
pub use registry::*;
pub use resolved::ResolvedConfig;
pub use sources::{ConfigTier, Layer, Merged, SourceResolver};
pub use validate::Validator;
pub use value::{SettingKind, SettingValue};

use crate::error::ConfigResult;

/// Resolve configuration from explicit inputs.
///
/// `cli` holds the flags given on this invocation, `env_vars` the process
/// environment. Search directories and working directory come from `paths`
/// and `validator`.
pub fn resolve_with<I, K, V>(
    registry: &Registry,
    cli: Layer,
    env_vars: I,
    paths: ConfigPaths,
    validator: &Validator,
) -> ConfigResult<ResolvedConfig>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<std::ffi::OsString>,
    V: Into<std::ffi::OsString>,
{
    let env = Layer::from_env(registry, env_vars)?;
    let merged = SourceResolver::with_paths(registry, paths).resolve(cli, env)?;
    validator.validate(&merged)
}

/// Resolve configuration using the process environment, the platform search
/// directories and the current working directory.
pub fn resolve(registry: &Registry, cli: Layer) -> ConfigResult<ResolvedConfig> {
    resolve_with(
        registry,
        cli,
        std::env::vars_os(),
        ConfigPaths::discover(),
        &Validator::from_current_dir()?,
    )
}
