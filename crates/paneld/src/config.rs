use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::refresh::backoff::RetryPolicy;

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/paneld.sock";

/// Daemon configuration, loaded from a TOML file.
///
/// Every field has a default, so an empty (or missing) file yields a daemon
/// that cycles the built-in screens without any network sources configured.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Path of the unix datagram socket on which commands are received.
    pub socket_path: PathBuf,
    /// When enabled, hardware buttons 0 and 3 page between screens instead
    /// of being forwarded to the active screen. Fixed for the process
    /// lifetime.
    pub page_buttons: bool,
    /// How often the active screen is shown even without any transition,
    /// to keep long-idle screens visually current.
    #[serde(deserialize_with = "parse_duration")]
    pub display_refresh: Duration,
    /// Screens loaded at startup, in cycling order.
    pub screens: Vec<String>,
    pub calendar: CalendarConfig,
    pub weather: WeatherConfig,
    pub retry: RetryConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            page_buttons: true,
            display_refresh: Duration::from_secs(15 * 60),
            screens: vec![
                "clock".to_string(),
                "calendar".to_string(),
                "weather".to_string(),
                "system".to_string(),
            ],
            calendar: CalendarConfig::default(),
            weather: WeatherConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    #[serde(deserialize_with = "parse_duration")]
    pub refresh: Duration,
    pub sources: Vec<CalendarSourceConfig>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            refresh: Duration::from_secs(15 * 60),
            sources: Vec::new(),
        }
    }
}

/// One calendar connection record.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarSourceConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    #[serde(deserialize_with = "parse_duration")]
    pub refresh: Duration,
    pub latitude: f64,
    pub longitude: f64,
    /// Display name of the location; the forecast provider works on
    /// coordinates only.
    pub city: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            refresh: Duration::from_secs(15 * 60),
            latitude: 45.4642,
            longitude: 9.1900,
            city: "Milano".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    #[serde(deserialize_with = "parse_duration")]
    pub initial_delay: Duration,
    #[serde(deserialize_with = "parse_duration")]
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: self.initial_delay,
            max_delay: self.max_delay,
        }
    }
}

/// Accepts humantime strings ("90s", "15m", "1h 30m").
fn parse_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

pub fn load_config(path: &Path) -> crate::Result<DaemonConfig> {
    let raw = std::fs::read_to_string(path)?;
    let config: DaemonConfig = toml::from_str(&raw)?;
    Ok(config)
}
