//! Runtime knobs for recomputation and the bundled transports.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::window::DEFAULT_WINDOW_LIMIT;

/// Which records the partition-wide `average` aggregation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AverageScope {
    /// `status != DNF`, matching `validCount` and `sum`.
    #[default]
    #[serde(rename = "valid")]
    ValidOnly,
    /// Every record in the partition, DNF durations included.
    #[serde(rename = "all")]
    AllRecords,
}

impl FromStr for AverageScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "valid" => Ok(AverageScope::ValidOnly),
            "all" => Ok(AverageScope::AllRecords),
            other => Err(ConfigError::Invalid {
                key: ENV_AVERAGE_SCOPE,
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => {
                write!(f, "invalid value {:?} for {}", value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

const ENV_WINDOW_LIMIT: &str = "SOLVE_STATS_WINDOW_LIMIT";
const ENV_AVERAGE_SCOPE: &str = "SOLVE_STATS_AVERAGE_SCOPE";
const ENV_PRUNE_EMPTY: &str = "SOLVE_STATS_PRUNE_EMPTY";
const ENV_BIND_ADDR: &str = "SOLVE_STATS_ADDR";
const ENV_POLL_MS: &str = "SOLVE_STATS_POLL_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Most recent records sampled for deviation and trimmed averages, at
    /// most 100.
    #[serde(default = "default_window_limit")]
    pub window_limit: usize,
    #[serde(default)]
    pub average_scope: AverageScope,
    /// Delete the snapshot instead of writing zeros once a partition is empty.
    #[serde(default)]
    pub prune_empty: bool,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_window_limit() -> usize {
    DEFAULT_WINDOW_LIMIT
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_poll_interval_ms() -> u64 {
    50
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            window_limit: default_window_limit(),
            average_scope: AverageScope::default(),
            prune_empty: false,
            bind_addr: default_bind_addr(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl StatsConfig {
    /// Defaults overridden by `SOLVE_STATS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_WINDOW_LIMIT) {
            let limit: usize = parse(ENV_WINDOW_LIMIT, &value)?;
            if limit > DEFAULT_WINDOW_LIMIT {
                return Err(ConfigError::Invalid {
                    key: ENV_WINDOW_LIMIT,
                    value,
                });
            }
            config.window_limit = limit;
        }
        if let Some(value) = lookup(ENV_AVERAGE_SCOPE) {
            config.average_scope = value.parse()?;
        }
        if let Some(value) = lookup(ENV_PRUNE_EMPTY) {
            config.prune_empty = parse(ENV_PRUNE_EMPTY, &value)?;
        }
        if let Some(value) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = value;
        }
        if let Some(value) = lookup(ENV_POLL_MS) {
            config.poll_interval_ms = parse(ENV_POLL_MS, &value)?;
        }

        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
