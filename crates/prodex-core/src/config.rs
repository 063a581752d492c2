use crate::import::ImportFilter;
use crate::store::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides the data directory (defaults to `~/.prodex`)
pub const HOME_ENV: &str = "PRODEX_HOME";

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHome,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quiet period before a typed query runs, in milliseconds
    pub debounce_ms: u64,
    /// Key the catalog is persisted under
    pub storage_key: String,
    pub import: ImportFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            import: ImportFilter::default(),
        }
    }
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load `config.toml` from `home`; a missing file yields the defaults
    pub fn load(home: &Path) -> Result<Self, ConfigError> {
        let path = home.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Toml { path, source })
    }
}

/// Data directory: `$PRODEX_HOME`, else `~/.prodex`
pub fn default_home() -> Result<PathBuf, ConfigError> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
    Ok(home.join(".prodex"))
}

/// Where the JSON key-value store lives inside the data directory
pub fn store_dir(home: &Path) -> PathBuf {
    home.join("store")
}
