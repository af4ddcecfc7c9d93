use crate::controller::seesaw::{DEFAULT_RESET_SETTLE, DEVICE_ADDRESS};
use crate::controller::{Orientation, PollSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const CONFIG_DIR: &str = ".config/seesaw-gamepad";
const CONFIG_FILE: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "SEESAW_GAMEPAD_CONFIG";
const SHUTDOWN_MARGIN: Duration = Duration::from_millis(250);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Runtime settings. The dead-zone calibration is fixed and not part of this.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// I2C bus number, i.e. `/dev/i2c-<bus>`
    pub bus: u8,
    pub address: u16,
    pub poll_interval_ms: u64,
    pub reset_settle_ms: u64,
    pub read_buttons: bool,
    pub orientation: Orientation,
    /// Optional I2C transaction timeout; unset means block indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_timeout_ms: Option<u32>,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bus: 5,
            address: DEVICE_ADDRESS,
            poll_interval_ms: 100,
            reset_settle_ms: DEFAULT_RESET_SETTLE.as_millis() as u64,
            read_buttons: true,
            orientation: Orientation::Screen,
            bus_timeout_ms: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Config location: `$SEESAW_GAMEPAD_CONFIG`, else `~/.config/seesaw-gamepad/config.toml`
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let mut path = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        Ok(path)
    }

    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
        let config = Self::from_toml_str(&content, path)?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content).await.map_err(write_err)
    }

    /// Writes the default config to `path` if nothing is there yet, then loads it.
    pub async fn ensure_default_config(path: &Path) -> Result<Self, ConfigError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if !exists {
            info!("Creating default configuration at {}", path.display());
            Self::default().save(path).await?;
        }
        Self::load(path).await
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            read_buttons: self.read_buttons,
            orientation: self.orientation,
        }
    }

    pub fn reset_settle(&self) -> Duration {
        Duration::from_millis(self.reset_settle_ms)
    }

    /// How long shutdown waits for the poll loop after cancelling it: one idle
    /// interval, a reset in progress and one tick's three bus transfers.
    pub fn shutdown_grace(&self) -> Duration {
        let transfers = u64::from(self.bus_timeout_ms.unwrap_or(0)) * 3;
        Duration::from_millis(self.poll_interval_ms + self.reset_settle_ms + transfers)
            + SHUTDOWN_MARGIN
    }
}
