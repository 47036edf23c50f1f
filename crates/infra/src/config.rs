//! Configuration loading and representation.
//!
//! Settings come from environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `USE_PERSISTENT_STORES` | `false` | use Postgres instead of the in-memory store |
//! | `DATABASE_URL` | none | Postgres URL, required when persistent |
//! | `SECONDARY_MEDIA_GRACE_MONTHS` | `6` | months before a release is on secondary media |
//! | `LOG_FORMAT` | `pretty` | `pretty` or `json` |

use cinema_movies::AvailableOnSecondaryMedia;
use cinema_observability::LogFormat;
use thiserror::Error;

/// Where movies are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres { database_url: String },
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store: StoreConfig,
    pub secondary_media_grace_months: i32,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::InMemory,
            secondary_media_grace_months: AvailableOnSecondaryMedia::DEFAULT_GRACE_MONTHS as i32,
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")]
    MissingDatabaseUrl,

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup` (environment-like key → value).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let use_persistent = match lookup("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => parse_bool("USE_PERSISTENT_STORES", &raw)?,
        };

        let store = if use_persistent {
            let database_url = lookup("DATABASE_URL")
                .filter(|url| !url.trim().is_empty())
                .ok_or(ConfigError::MissingDatabaseUrl)?;
            StoreConfig::Postgres { database_url }
        } else {
            StoreConfig::InMemory
        };

        let secondary_media_grace_months = match lookup("SECONDARY_MEDIA_GRACE_MONTHS") {
            None => defaults.secondary_media_grace_months,
            Some(raw) => raw.trim().parse::<i32>().map_err(|_| ConfigError::InvalidValue {
                key: "SECONDARY_MEDIA_GRACE_MONTHS",
                value: raw.clone(),
            })?,
        };

        let log_format = match lookup("LOG_FORMAT") {
            None => defaults.log_format,
            Some(raw) => raw.parse::<LogFormat>().map_err(|_| ConfigError::InvalidValue {
                key: "LOG_FORMAT",
                value: raw.clone(),
            })?,
        };

        Ok(Self {
            store,
            secondary_media_grace_months,
            log_format,
        })
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
