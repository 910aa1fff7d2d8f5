//! Service configuration.
//!
//! Settings come from a TOML file; secrets may instead be supplied through
//! environment variables, which take precedence over the file.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::darwin::DarwinConfig;
use crate::domain::{InvalidStationCode, StationCode, StationPair};
use crate::scheduler::{Direction, StationPairJob};
use crate::telegram::TelegramConfig;

/// Variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "TRAIN_CHECKER_CONFIG";

/// Config file used when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "train-checker.toml";

const API_KEY_VAR: &str = "TRAIN_CHECKER_API_KEY";
const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("no {0} schedules configured")]
    NoSchedules(Direction),

    #[error("invalid station in `{field}`: {source}")]
    InvalidStation {
        field: &'static str,
        #[source]
        source: InvalidStationCode,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub train_checker: TrainCheckerSection,
    pub telegram: TelegramSection,
    pub schedules: ScheduleSection,
    pub server: ServerSection,
}

/// Route and departures API settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TrainCheckerSection {
    pub departure_station: String,
    pub arrival_station: String,
    pub api_key: String,
    pub base_address: String,
    /// Minutes ahead of the request time to include.
    pub time_window: u16,
}

impl Default for TrainCheckerSection {
    fn default() -> Self {
        Self {
            departure_station: String::new(),
            arrival_station: String::new(),
            api_key: String::new(),
            base_address: String::new(),
            time_window: 60,
        }
    }
}

impl fmt::Debug for TrainCheckerSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainCheckerSection")
            .field("departure_station", &self.departure_station)
            .field("arrival_station", &self.arrival_station)
            .field("api_key", &"[REDACTED]")
            .field("base_address", &self.base_address)
            .field("time_window", &self.time_window)
            .finish()
    }
}

/// Telegram bot settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

impl fmt::Debug for TelegramSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSection")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Cron triggers for each direction, six-field with seconds first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleSection {
    pub forward: Vec<String>,
    pub reverse: Vec<String>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    /// How long shutdown waits for in-flight checks.
    pub shutdown_grace_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            shutdown_grace_secs: 30,
        }
    }
}

impl Config {
    /// Read `path`, apply environment overrides, and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse without validating.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Replace secrets with values from `lookup`, ignoring blank values.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let overrides = [
            (API_KEY_VAR, &mut self.train_checker.api_key),
            (BOT_TOKEN_VAR, &mut self.telegram.bot_token),
            (CHAT_ID_VAR, &mut self.telegram.chat_id),
        ];
        for (key, field) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *field = value;
            }
        }
    }

    /// Check that everything needed to run is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("train_checker.api_key", &self.train_checker.api_key),
            ("train_checker.base_address", &self.train_checker.base_address),
            ("telegram.bot_token", &self.telegram.bot_token),
            ("telegram.chat_id", &self.telegram.chat_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }

        self.jobs()?;
        Ok(())
    }

    /// The configured departure and arrival stations.
    pub fn default_pair(&self) -> Result<StationPair, ConfigError> {
        let origin = station(
            "train_checker.departure_station",
            &self.train_checker.departure_station,
        )?;
        let destination = station(
            "train_checker.arrival_station",
            &self.train_checker.arrival_station,
        )?;
        Ok(StationPair::new(origin, destination))
    }

    /// Forward job for the configured pair and reverse job for the swapped
    /// pair.
    pub fn jobs(&self) -> Result<Vec<StationPairJob>, ConfigError> {
        let pair = self.default_pair()?;
        let reverse = pair.reversed();
        Ok(vec![
            StationPairJob::new(Direction::Forward, pair, self.schedules.forward.clone())?,
            StationPairJob::new(Direction::Reverse, reverse, self.schedules.reverse.clone())?,
        ])
    }

    pub fn darwin_config(&self) -> DarwinConfig {
        DarwinConfig::new(
            self.train_checker.base_address.trim(),
            self.train_checker.api_key.trim(),
        )
        .with_time_window(self.train_checker.time_window)
    }

    pub fn telegram_config(&self) -> TelegramConfig {
        TelegramConfig::new(self.telegram.bot_token.trim(), self.telegram.chat_id.trim())
            .with_api_base(self.telegram.api_base.trim())
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_grace_secs)
    }
}

fn station(field: &'static str, value: &str) -> Result<StationCode, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing(field));
    }
    StationCode::parse_normalized(value)
        .map_err(|source| ConfigError::InvalidStation { field, source })
}
