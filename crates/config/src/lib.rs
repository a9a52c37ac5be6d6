//! Layered configuration.
//!
//! Sources are merged in this order, later ones overriding earlier ones:
//!
//! 1. Built-in defaults.
//! 2. `config.toml`, `config.yaml` or `config.json` in the platform config
//!    directory (e.g. `~/.config/shelfscan/` on Linux).
//! 3. A config file passed explicitly (`--config`), format picked by
//!    extension.
//! 4. Environment variables prefixed `SHELFSCAN_`, with `__` separating
//!    nested keys: `SHELFSCAN_LOOKUP__TIMEOUT_SECS=10`.
//!
//! ```toml
//! library = "/home/me/books/library.db"
//!
//! [lookup]
//! endpoint = "https://www.googleapis.com/books/v1/volumes?q=isbn:"
//! timeout_secs = 10
//!
//! [scanner]
//! rescan_cooldown_ms = 2000
//!
//! [export]
//! title = "My Personal Library"
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "SHELFSCAN_";
const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes?q=isbn:";
const DEFAULT_RESCAN_COOLDOWN_MS: u64 = 2000;
const DEFAULT_EXPORT_TITLE: &str = "My Personal Library";
const LIBRARY_FILE_NAME: &str = "library.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite library database.
    pub library: PathBuf,
    pub lookup: LookupConfig,
    pub scanner: ScannerConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// URL the normalized identifier is appended to, percent-encoded.
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Unset means lookups may wait forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub rescan_cooldown_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub title: String,
}

impl Default for Config {
    fn default() -> Self {
        let library = project_dirs()
            .map(|dirs| dirs.data_dir().join(LIBRARY_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(LIBRARY_FILE_NAME));
        Self {
            library,
            lookup: LookupConfig::default(),
            scanner: ScannerConfig::default(),
            export: ExportConfig::default(),
        }
    }
}
impl Default for LookupConfig {
    fn default() -> Self {
        Self { endpoint: DEFAULT_ENDPOINT.to_string(), user_agent: None, timeout_secs: None }
    }
}
impl Default for ScannerConfig {
    fn default() -> Self {
        Self { rescan_cooldown_ms: DEFAULT_RESCAN_COOLDOWN_MS }
    }
}
impl Default for ExportConfig {
    fn default() -> Self {
        Self { title: DEFAULT_EXPORT_TITLE.to_string() }
    }
}

impl LookupConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl ScannerConfig {
    pub fn rescan_cooldown(&self) -> Duration {
        Duration::from_millis(self.rescan_cooldown_ms)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "shelfscan")
}

impl Config {
    /// Load and validate configuration from every source.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let user_dir = project_dirs().map(|dirs| dirs.config_dir().to_path_buf());
        Self::load_from(user_dir.as_deref(), explicit)
    }

    fn load_from(user_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(user_dir, explicit)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()
    }

    fn figment(user_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(dir) = user_dir {
            tracing::debug!(dir = %dir.display(), "Looking for user configuration");
            figment = figment
                .merge(Toml::file(dir.join("config.toml")))
                .merge(Yaml::file(dir.join("config.yaml")))
                .merge(Json::file(dir.join("config.json")));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            tracing::debug!(path = %path.display(), "Loading configuration file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Check values no deserializer can, and resolve the library path.
    pub fn validate(mut self) -> Result<Self> {
        if self.lookup.endpoint.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("lookup.endpoint must not be empty"));
        }
        if self.library.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("library must not be empty"));
        }
        if self.library.is_relative() {
            self.library = std::path::absolute(&self.library).or_raise(|| ErrorKind::Invalid("library"))?;
        }
        if self.lookup.timeout_secs == Some(0) {
            exn::bail!(ErrorKind::Invalid("lookup.timeout_secs must be greater than zero"));
        }
        Ok(self)
    }
}
