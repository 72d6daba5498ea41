// Search and store client configuration
use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

pub const TIMEOUT_ENV: &str = "ROOM_SEARCH_TIMEOUT_MS";
pub const FAILURE_POLICY_ENV: &str = "ROOM_SEARCH_FAILURE_POLICY";
pub const MAX_IN_FLIGHT_ENV: &str = "ROOM_SEARCH_MAX_IN_FLIGHT";
pub const STORE_URL_ENV: &str = "ROOM_STORE_URL";
pub const STORE_API_KEY_ENV: &str = "ROOM_STORE_API_KEY";
pub const STORE_TIMEOUT_ENV: &str = "ROOM_STORE_TIMEOUT_MS";

/// What to do with a room whose reservation or blockout read failed.
///
/// The reference behavior is `ExcludeRoom`: a room whose availability cannot
/// be established is never shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckFailurePolicy {
    #[default]
    ExcludeRoom,
    ReportUnknown,
    FailSearch,
}

impl FromStr for CheckFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclude_room" | "exclude" => Ok(CheckFailurePolicy::ExcludeRoom),
            "report_unknown" | "unknown" => Ok(CheckFailurePolicy::ReportUnknown),
            "fail_search" | "fail" => Ok(CheckFailurePolicy::FailSearch),
            other => Err(format!("unknown check failure policy {other:?}")),
        }
    }
}

// How per-room checks are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EvaluationMode {
    Sequential,
    Concurrent { max_in_flight: usize },
}

impl Default for EvaluationMode {
    fn default() -> Self {
        EvaluationMode::Concurrent { max_in_flight: 8 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub call_timeout_ms: u64,
    pub check_failure_policy: CheckFailurePolicy,
    pub evaluation: EvaluationMode,
    pub prefer_batch: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 5000,
            check_failure_policy: CheckFailurePolicy::default(),
            evaluation: EvaluationMode::default(),
            prefer_batch: true,
        }
    }
}

impl SearchConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SearchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Unset keys fall back to the defaults; set but malformed keys are errors
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SearchConfig::default();
        let call_timeout_ms = try_load(&lookup, TIMEOUT_ENV, defaults.call_timeout_ms)?;
        let check_failure_policy =
            try_load(&lookup, FAILURE_POLICY_ENV, defaults.check_failure_policy)?;
        let evaluation = match lookup(MAX_IN_FLIGHT_ENV) {
            Some(raw) => match parse_value::<usize>(MAX_IN_FLIGHT_ENV, &raw)? {
                0 | 1 => EvaluationMode::Sequential,
                max_in_flight => EvaluationMode::Concurrent { max_in_flight },
            },
            None => {
                info!("{MAX_IN_FLIGHT_ENV} not set, using default: {:?}", defaults.evaluation);
                defaults.evaluation
            }
        };

        let config = Self {
            call_timeout_ms,
            check_failure_policy,
            evaluation,
            prefer_batch: defaults.prefer_batch,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.call_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "call_timeout_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        if let EvaluationMode::Concurrent { max_in_flight: 0 } = self.evaluation {
            return Err(ConfigError::Invalid {
                key: "max_in_flight",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

// Connection settings for the hosted store
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_client_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_client_timeout_ms() -> u64 {
    10_000
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(STORE_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(STORE_URL_ENV))?;
        let api_key = lookup(STORE_API_KEY_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(STORE_API_KEY_ENV))?;
        let timeout_ms = try_load(&lookup, STORE_TIMEOUT_ENV, default_client_timeout_ms())?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_ms,
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => {
            info!("{key} not set, using default: {default:?}");
            Ok(default)
        }
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            message: e.to_string(),
        }
    })
}
