use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::error::ConfigError;

/// Deployment mode. Admission control only runs in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Production,
    Development,
    Test,
}

impl FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(RuntimeMode::Production),
            "development" | "dev" => Ok(RuntimeMode::Development),
            "test" => Ok(RuntimeMode::Test),
            other => Err(format!("expected production, development or test, got {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: RuntimeMode,
    pub channel_capacity: usize,
    pub dispatch_delay: Duration,
    pub processing_delay: Duration,
    pub completion_delay: Duration,
    pub load_sample_interval: Duration,
    pub load_threshold: f64,
    pub retry_after: Duration,
    /// Memory the process may use; `None` compares against total system memory.
    pub memory_budget_bytes: Option<u64>,
    /// Where product and order journals live; `None` keeps everything in memory.
    pub journal_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: RuntimeMode::Production,
            channel_capacity: 100,
            dispatch_delay: Duration::from_millis(100),
            processing_delay: Duration::from_millis(2000),
            completion_delay: Duration::from_millis(3000),
            load_sample_interval: Duration::from_millis(5000),
            load_threshold: 0.85,
            retry_after: Duration::from_secs(60),
            memory_budget_bytes: None,
            journal_dir: None,
        }
    }
}

impl Config {
    /// Reads `ORDER_PIPELINE_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let millis = |key: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            Ok(parse_var::<u64>(&lookup, key)?.map(Duration::from_millis).unwrap_or(default))
        };

        let channel_capacity = parse_var::<usize>(&lookup, "ORDER_PIPELINE_CHANNEL_CAPACITY")?
            .unwrap_or(defaults.channel_capacity);
        if channel_capacity == 0 {
            return Err(invalid("ORDER_PIPELINE_CHANNEL_CAPACITY", "0", "must be at least 1"));
        }

        let load_threshold = parse_var::<f64>(&lookup, "ORDER_PIPELINE_LOAD_THRESHOLD")?
            .unwrap_or(defaults.load_threshold);
        if !(load_threshold > 0.0 && load_threshold <= 1.0) {
            return Err(invalid(
                "ORDER_PIPELINE_LOAD_THRESHOLD",
                &load_threshold.to_string(),
                "must be in (0, 1]",
            ));
        }

        Ok(Self {
            mode: parse_var(&lookup, "ORDER_PIPELINE_MODE")?.unwrap_or(defaults.mode),
            channel_capacity,
            dispatch_delay: millis("ORDER_PIPELINE_DISPATCH_DELAY_MS", defaults.dispatch_delay)?,
            processing_delay: millis("ORDER_PIPELINE_PROCESSING_DELAY_MS", defaults.processing_delay)?,
            completion_delay: millis("ORDER_PIPELINE_COMPLETION_DELAY_MS", defaults.completion_delay)?,
            load_sample_interval: millis("ORDER_PIPELINE_LOAD_SAMPLE_INTERVAL_MS", defaults.load_sample_interval)?,
            load_threshold,
            retry_after: parse_var::<u64>(&lookup, "ORDER_PIPELINE_RETRY_AFTER_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.retry_after),
            memory_budget_bytes: parse_var(&lookup, "ORDER_PIPELINE_MEMORY_BUDGET_BYTES")?,
            journal_dir: lookup("ORDER_PIPELINE_JOURNAL_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(key, &raw, &e.to_string())),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
