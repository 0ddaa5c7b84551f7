//! Environment-driven service settings.

use std::time::Duration;

use thiserror::Error;

use crate::bus::DEFAULT_BUS_CAPACITY;
use crate::core::query::DEFAULT_MAX_LIMIT;
use crate::runtime::scheduler::{DEFAULT_ADD_INTERVAL, DEFAULT_MODIFY_INTERVAL};
use crate::runtime::SchedulerConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";

/// Size of the seeded universe `1..=N`.
pub const DEFAULT_STORE_SIZE: u64 = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub store_size: u64,
    pub scheduler: SchedulerConfig,
    pub event_capacity: usize,
    pub max_page_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            store_size: DEFAULT_STORE_SIZE,
            scheduler: SchedulerConfig {
                add_interval: DEFAULT_ADD_INTERVAL,
                modify_interval: DEFAULT_MODIFY_INTERVAL,
            },
            event_capacity: DEFAULT_BUS_CAPACITY,
            max_page_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

impl AppConfig {
    /// Load from the process environment, falling back to defaults for unset
    /// or blank variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let bind_addr = match (get("SELECTRIX_BIND_ADDR"), get("PORT")) {
            (Some(addr), _) => addr,
            (None, Some(port)) => {
                let port: u16 = parse("PORT", &port)?;
                format!("0.0.0.0:{port}")
            }
            (None, None) => defaults.bind_addr,
        };

        let store_size = match get("SELECTRIX_STORE_SIZE") {
            Some(raw) => parse("SELECTRIX_STORE_SIZE", &raw)?,
            None => defaults.store_size,
        };

        let add_interval = match get("SELECTRIX_ADD_INTERVAL_MS") {
            Some(raw) => millis("SELECTRIX_ADD_INTERVAL_MS", &raw)?,
            None => defaults.scheduler.add_interval,
        };
        let modify_interval = match get("SELECTRIX_MODIFY_INTERVAL_MS") {
            Some(raw) => millis("SELECTRIX_MODIFY_INTERVAL_MS", &raw)?,
            None => defaults.scheduler.modify_interval,
        };

        let event_capacity = match get("SELECTRIX_EVENT_CAPACITY") {
            Some(raw) => positive("SELECTRIX_EVENT_CAPACITY", &raw)?,
            None => defaults.event_capacity,
        };
        let max_page_limit = match get("SELECTRIX_MAX_PAGE_LIMIT") {
            Some(raw) => positive("SELECTRIX_MAX_PAGE_LIMIT", &raw)?,
            None => defaults.max_page_limit,
        };

        Ok(Self {
            bind_addr,
            store_size,
            scheduler: SchedulerConfig {
                add_interval,
                modify_interval,
            },
            event_capacity,
            max_page_limit,
        })
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: "not a number",
    })
}

fn positive(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match parse::<usize>(key, raw)? {
        0 => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "must be greater than zero",
        }),
        value => Ok(value),
    }
}

fn millis(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    positive(key, raw).map(|ms| Duration::from_millis(ms as u64))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.scheduler.add_interval, Duration::from_secs(10));
        assert_eq!(config.scheduler.modify_interval, Duration::from_secs(1));
        assert_eq!(config.store_size, 1_000_000);
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let config = load(&[
            ("SELECTRIX_STORE_SIZE", "500"),
            ("SELECTRIX_MODIFY_INTERVAL_MS", "250"),
            ("SELECTRIX_ADD_INTERVAL_MS", "   "),
            ("PORT", "8080"),
        ])
        .unwrap();

        assert_eq!(config.store_size, 500);
        assert_eq!(config.scheduler.modify_interval, Duration::from_millis(250));
        assert_eq!(config.scheduler.add_interval, DEFAULT_ADD_INTERVAL);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_explicit_bind_addr_wins_over_port() {
        let config = load(&[("SELECTRIX_BIND_ADDR", "127.0.0.1:9000"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("SELECTRIX_MODIFY_INTERVAL_MS", "0")]),
            Err(ConfigError::Invalid { key: "SELECTRIX_MODIFY_INTERVAL_MS", .. })
        ));
        assert!(matches!(
            load(&[("SELECTRIX_STORE_SIZE", "lots")]),
            Err(ConfigError::Invalid { key: "SELECTRIX_STORE_SIZE", .. })
        ));
    }
}
