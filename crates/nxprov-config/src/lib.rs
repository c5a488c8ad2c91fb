//! Configuration file loading for nxprov.
//!
//! Connection defaults and provisioning-plan overrides, layered with figment:
//! built-in defaults, then a TOML file, then `NXPROV_`-prefixed environment
//! variables (`NXPROV_PLAN__VLAN_END=100`). CLI flags are applied on top by
//! the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nxprov_core::{CoreError, ProvisioningPlan, Protocol};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("invalid configuration: {0}")]
    Invalid(#[from] CoreError),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionDefaults,

    /// Overrides for any field of the stock plan.
    #[serde(default)]
    pub plan: ProvisioningPlan,
}

/// Connection settings that have sensible defaults. Host and credentials
/// always come from the command line or its environment fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionDefaults {
    pub proto: Protocol,
    pub port: u16,
    pub verify_tls: bool,
    /// Per-request timeout. Unset means no timeout.
    pub timeout_secs: Option<u64>,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            proto: Protocol::Http,
            port: 10180,
            verify_tls: true,
            timeout_secs: None,
        }
    }
}

impl ConnectionDefaults {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Platform config file location, e.g. `~/.config/nxprov/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "nxprov").map(|dirs| dirs.config_dir().join("config.toml"))
}

// ── Config loading ──────────────────────────────────────────────────

fn figment(file: Option<&Path>) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
    if let Some(file) = file {
        figment = figment.merge(Toml::file(file));
    }
    // Host and credential variables belong to the CLI, not the file schema.
    figment.merge(
        Env::prefixed("NXPROV_")
            .ignore(&["ip", "user", "passwd"])
            .split("__"),
    )
}

/// Load configuration from `path`, or from the platform location if `None`.
///
/// An explicit path must exist; a missing platform file just means defaults.
/// The resulting plan is validated before it is returned.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) if !path.is_file() => {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Some(path) => Some(path.to_path_buf()),
        None => config_path().filter(|p| p.is_file()),
    };

    let config: Config = figment(file.as_deref()).extract()?;
    config.plan.validate()?;
    Ok(config)
}
