use crate::replay::clock::{parse_timezone, DEFAULT_TIMEZONE};
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: String,
    /// Fail on malformed records instead of skipping them
    #[serde(default)]
    pub strict: bool,
}

fn default_data_path() -> String {
    "data/last_5_days_data.json".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    /// Delay between ticks; 0 replays as fast as the runtime allows
    #[serde(default)]
    pub tick_interval_ms: u64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 0,
            timezone: default_timezone(),
        }
    }
}

impl ReplayConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn tz(&self) -> Result<Tz> {
        Ok(parse_timezone(&self.timezone)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    /// Padding added around the revealed close range on the price axis
    #[serde(default = "default_price_buffer")]
    pub price_buffer: f64,
    /// Price axis used before any candle is revealed
    #[serde(default)]
    pub default_min: f64,
    #[serde(default = "default_max")]
    pub default_max: f64,
}

fn default_price_buffer() -> f64 {
    100.0
}

fn default_max() -> f64 {
    2000.0
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            price_buffer: default_price_buffer(),
            default_min: 0.0,
            default_max: default_max(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let settings = ConfigLoader::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(
                Environment::with_prefix("REPLAY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    fn config_path() -> PathBuf {
        // Try local config first, then next to the executable
        let local_config = PathBuf::from("config/default.toml");
        if local_config.exists() {
            return local_config;
        }

        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let exe_config = exe_dir.join("config/default.toml");
                if exe_config.exists() {
                    return exe_config;
                }
            }
        }

        local_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data.path, "data/last_5_days_data.json");
        assert!(!config.data.strict);
        assert_eq!(config.replay.tick_interval(), Duration::ZERO);
        assert_eq!(config.replay.tz().unwrap(), chrono_tz::Asia::Kolkata);
        assert_eq!(config.chart.price_buffer, 100.0);
        assert_eq!(config.server.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings = ConfigLoader::builder()
            .add_source(File::from_str(
                "[replay]\ntick_interval_ms = 2000\n\n[server]\nport = 8080\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(config.replay.tick_interval(), Duration::from_secs(2));
        assert_eq!(config.replay.timezone, "Asia/Kolkata");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.chart.default_max, 2000.0);
    }
}
