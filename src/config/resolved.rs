//! The resolved, immutable configuration handed to the server.

use super::sources::ConfigTier;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Effective runtime configuration.
///
/// Built once at startup by [`Validator`](super::Validator) and read-only
/// afterwards. `gopherroot` is absolute and was an existing, readable
/// directory when resolution completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub(crate) gopherroot: PathBuf,
    pub(crate) port: u16,
    pub(crate) address: IpAddr,
    pub(crate) test_mode: bool,
    pub(crate) selector_limit: usize,
    #[serde(serialize_with = "serialize_duration")]
    pub(crate) selector_timeout: Duration,
    pub(crate) admin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) config_file: Option<PathBuf>,
    #[serde(skip)]
    pub(crate) provenance: BTreeMap<&'static str, ConfigTier>,
}

impl ResolvedConfig {
    /// Root directory of servable content.
    pub fn gopherroot(&self) -> &Path {
        &self.gopherroot
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// Address and port to bind.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    /// Maximum selector length in bytes.
    pub fn selector_limit(&self) -> usize {
        self.selector_limit
    }

    /// How long a client may take to send its selector.
    pub fn selector_timeout(&self) -> Duration {
        self.selector_timeout
    }

    /// Administrator contact shown to clients.
    pub fn admin(&self) -> &str {
        &self.admin
    }

    /// The config file that was loaded, if any.
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Which source supplied a setting.
    pub fn source_of(&self, name: &str) -> Option<ConfigTier> {
        self.provenance.get(name).copied()
    }

    /// Every setting that has a value, with the source that supplied it.
    pub fn sources(&self) -> impl Iterator<Item = (&'static str, ConfigTier)> + '_ {
        self.provenance.iter().map(|(name, tier)| (*name, *tier))
    }
}

fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&humantime::format_duration(*duration))
}
