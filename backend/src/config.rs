use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
    /// Root directory of the local file store.
    pub storage_root: PathBuf,
    /// Directory, relative to the file store, that receives dashboard exports.
    pub export_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        // r2d2 refuses an empty pool
        let pool_size: u32 = parse_or(&lookup, "DATABASE_POOL_SIZE", 10)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_POOL_SIZE",
                value: pool_size.to_string(),
            });
        }

        Ok(Self {
            database_url,
            host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "SERVER_PORT", 2022)?,
            pool_size,
            storage_root: lookup("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./storage")),
            export_dir: lookup("EXPORT_DIR").unwrap_or_else(|| "exports".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
