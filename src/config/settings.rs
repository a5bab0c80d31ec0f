use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Unknown STORAGE_TYPE '{0}' (expected 'memory' or 'postgres')")]
    UnknownStorageKind(String),

    #[error("POSTGRES_DSN must be set when STORAGE_TYPE=postgres")]
    MissingDsn,

    #[error("Invalid value '{value}' for {key}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Which `ContentStore` the process runs on. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Postgres,
}

impl FromStr for StorageKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "postgres" => Ok(StorageKind::Postgres),
            _ => Err(ConfigError::UnknownStorageKind(s.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub storage_kind: StorageKind,
    pub postgres_dsn: Option<String>,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
}

// The DSN carries credentials.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("storage_kind", &self.storage_kind)
            .field("postgres_dsn", &self.postgres_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("db_max_connections", &self.db_max_connections)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load settings from the process environment (after `.env` has been applied).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let storage_kind = match get("STORAGE_TYPE") {
            Some(kind) => kind.parse()?,
            None => StorageKind::Memory,
        };

        let postgres_dsn = get("POSTGRES_DSN");
        if storage_kind == StorageKind::Postgres && postgres_dsn.is_none() {
            return Err(ConfigError::MissingDsn);
        }

        Ok(Config {
            storage_kind,
            postgres_dsn,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 10)?,
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or("PORT", get("PORT"), 8080)?,
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        None => Ok(default),
    }
}
