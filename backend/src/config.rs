//! Application configuration.
//!
//! Read from a TOML file, then adjusted by environment variables. Every
//! section and field has a default, so an empty file (or no file) is valid
//! apart from the weather coordinates, which have none.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::SensorType;
use crate::weather::{Coordinates, DEFAULT_API_URL};

pub const CONFIG_ENV: &str = "HEARTH_CONFIG";

/// Largest forecast offset, either direction, in hours.
pub const MAX_FORECAST_HOURS: i64 = 240;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
    #[serde(default)]
    pub zwave: ZWaveSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSettings {
    #[serde(default = "default_weather_name")]
    pub name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub elevation: i64,
    /// Hours ahead of now to pick readings for.
    #[serde(default)]
    pub forecast: i64,
    #[serde(default = "default_monitored_conditions")]
    pub monitored_conditions: Vec<SensorType>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZWaveSettings {
    #[serde(default = "default_device_config_path")]
    pub device_config_path: PathBuf,
    #[serde(default)]
    pub network_snapshot: Option<PathBuf>,
    #[serde(default = "default_network_config_path")]
    pub network_config_path: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_weather_name() -> String {
    "yr".to_string()
}

fn default_monitored_conditions() -> Vec<SensorType> {
    vec![SensorType::Symbol]
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_device_config_path() -> PathBuf {
    PathBuf::from("zwave_device_config.json")
}

fn default_network_config_path() -> PathBuf {
    PathBuf::from("zwcfg.json")
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            name: default_weather_name(),
            latitude: None,
            longitude: None,
            elevation: 0,
            forecast: 0,
            monitored_conditions: default_monitored_conditions(),
            api_url: default_api_url(),
        }
    }
}

impl Default for ZWaveSettings {
    fn default() -> Self {
        Self {
            device_config_path: default_device_config_path(),
            network_snapshot: None,
            network_config_path: default_network_config_path(),
        }
    }
}

impl WeatherSettings {
    /// `None` when latitude or longitude is unset.
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates {
            latitude: self.latitude?,
            longitude: self.longitude?,
            elevation: self.elevation,
        })
    }
}

impl AppConfig {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Load from `$HEARTH_CONFIG` if set, otherwise the first of
    /// `hearth.toml`, `backend/hearth.toml`, `../hearth.toml` that exists.
    /// Falls back to defaults when none does. `HOST` and `PORT` override the
    /// server section.
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(PathBuf::from(path))?,
            None => {
                let search_paths = [
                    PathBuf::from("hearth.toml"),
                    PathBuf::from("backend/hearth.toml"),
                    PathBuf::from("../hearth.toml"),
                ];
                match search_paths.iter().find(|path| path.exists()) {
                    Some(path) => Self::from_file(path)?,
                    None => Self::default(),
                }
            }
        };

        config.apply_env_overrides(std::env::var("HOST").ok(), std::env::var("PORT").ok())?;
        Ok(config)
    }

    fn apply_env_overrides(
        &mut self,
        host: Option<String>,
        port: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a port number: {}", port)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let weather = &self.weather;
        if weather.monitored_conditions.is_empty() {
            return Err(ConfigError::Invalid(
                "weather.monitored_conditions must list at least one condition".to_string(),
            ));
        }
        if !(-MAX_FORECAST_HOURS..=MAX_FORECAST_HOURS).contains(&weather.forecast) {
            return Err(ConfigError::Invalid(format!(
                "weather.forecast must be within {} hours: {}",
                MAX_FORECAST_HOURS, weather.forecast
            )));
        }
        if let Some(latitude) = weather.latitude {
            if !(-90.0..=90.0).contains(&latitude) {
                return Err(ConfigError::Invalid(format!(
                    "weather.latitude out of range: {}",
                    latitude
                )));
            }
        }
        if let Some(longitude) = weather.longitude {
            if !(-180.0..=180.0).contains(&longitude) {
                return Err(ConfigError::Invalid(format!(
                    "weather.longitude out of range: {}",
                    longitude
                )));
            }
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
