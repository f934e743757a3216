use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;

pub const DATABASE_FILE_ENV: &str = "BUDGET_TRACKER_DATABASE";
pub const POOL_SIZE_ENV: &str = "BUDGET_TRACKER_POOL_SIZE";

pub const DEFAULT_DATABASE_FILE: &str = "budget_tracker.db";
pub const DEFAULT_POOL_SIZE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub database_file: PathBuf,
    pub pool_size: u32,
}

impl DatabaseConfig {
    /// Reads the configuration from the process environment. `main` loads
    /// any `.env` file before this runs.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_file = lookup(DATABASE_FILE_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE));

        let pool_size = match lookup(POOL_SIZE_ENV) {
            Some(value) => parse_pool_size(&value)?,
            None => DEFAULT_POOL_SIZE,
        };

        Ok(DatabaseConfig {
            database_file,
            pool_size,
        })
    }
}

fn parse_pool_size(value: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: POOL_SIZE_ENV,
        value: value.to_string(),
        reason,
    };
    let size = value.trim().parse::<u32>().map_err(|e| invalid(e.to_string()))?;
    if size == 0 {
        return Err(invalid("pool size must be at least 1".to_string()));
    }
    Ok(size)
}
