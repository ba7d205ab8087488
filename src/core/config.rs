//! # Configuration
//!
//! Environment-driven configuration. Binaries call `dotenvy::dotenv()` first so
//! a local `.env` file can provide any of these keys.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Added notifier command and campus locations file
//! - 1.0.0: Initial configuration with database, logging and reminder timing

use anyhow::{anyhow, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATABASE_PATH: &str = "yulin_campus.db";
pub const DEFAULT_GEOIP_URL: &str = "http://ip-api.com/json/";
pub const DEFAULT_NEWS_URL: &str = "http://www.yulinu.edu.cn/";
pub const DEFAULT_NOTICES_URL: &str = "http://jwc.yulinu.edu.cn/";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub log_level: String,
    /// Seconds between reminder ticks; also the width of the match window
    pub reminder_tick_secs: u64,
    /// How long before an event its reminder fires
    pub reminder_lead_minutes: i64,
    pub geoip_url: String,
    pub geoip_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub campus_locations_path: Option<String>,
    pub notify_command: Option<String>,
    pub news_url: String,
    pub notices_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            log_level: "info".to_string(),
            reminder_tick_secs: 60,
            reminder_lead_minutes: 10,
            geoip_url: DEFAULT_GEOIP_URL.to_string(),
            geoip_timeout_secs: 10,
            http_timeout_secs: 10,
            campus_locations_path: None,
            notify_command: None,
            news_url: DEFAULT_NEWS_URL.to_string(),
            notices_url: DEFAULT_NOTICES_URL.to_string(),
        }
    }
}

impl Config {
    /// Build configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let config = Config {
            database_path: get("DATABASE_PATH").unwrap_or(defaults.database_path),
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            reminder_tick_secs: parse_or("REMINDER_TICK_SECS", get("REMINDER_TICK_SECS"), defaults.reminder_tick_secs)?,
            reminder_lead_minutes: parse_or(
                "REMINDER_LEAD_MINUTES",
                get("REMINDER_LEAD_MINUTES"),
                defaults.reminder_lead_minutes,
            )?,
            geoip_url: get("GEOIP_URL").unwrap_or(defaults.geoip_url),
            geoip_timeout_secs: parse_or("GEOIP_TIMEOUT_SECS", get("GEOIP_TIMEOUT_SECS"), defaults.geoip_timeout_secs)?,
            http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"), defaults.http_timeout_secs)?,
            campus_locations_path: get("CAMPUS_LOCATIONS_PATH"),
            notify_command: get("NOTIFY_COMMAND"),
            news_url: get("NEWS_URL").unwrap_or(defaults.news_url),
            notices_url: get("NOTICES_URL").unwrap_or(defaults.notices_url),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.reminder_tick_secs == 0 {
            return Err(anyhow!("REMINDER_TICK_SECS must be greater than zero"));
        }
        // Lead time must stay under a day so a reminder never lands two dates early
        if !(0..24 * 60).contains(&self.reminder_lead_minutes) {
            return Err(anyhow!(
                "REMINDER_LEAD_MINUTES must be between 0 and 1439, got {}",
                self.reminder_lead_minutes
            ));
        }
        if self.geoip_timeout_secs == 0 || self.http_timeout_secs == 0 {
            return Err(anyhow!("HTTP timeouts must be greater than zero"));
        }
        Ok(())
    }

    pub fn reminder_tick_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_tick_secs)
    }

    pub fn geoip_timeout(&self) -> Duration {
        Duration::from_secs(self.geoip_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid value for {key} ({raw}): {e}")),
        None => Ok(default),
    }
}
