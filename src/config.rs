use std::{collections::HashMap, time::Duration};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Database,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub fallback_url: Option<String>,
    pub connect_timeout: Duration,
    pub max_connections: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    pub storage: StorageBackend,
    pub database: Option<DatabaseConfig>,
    pub jwt_secret: String,
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let storage = match get("EPIC_STORAGE").as_deref() {
            None | Some("database") => StorageBackend::Database,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "EPIC_STORAGE",
                    value: other.to_string(),
                });
            }
        };

        let database = match storage {
            StorageBackend::Memory => None,
            StorageBackend::Database => Some(DatabaseConfig {
                url: require("EPIC_DATABASE_URL")?,
                fallback_url: get("EPIC_FALLBACK_DATABASE_URL"),
                connect_timeout: Duration::from_secs(parse_or(
                    "EPIC_DB_CONNECT_TIMEOUT_SECS",
                    get("EPIC_DB_CONNECT_TIMEOUT_SECS"),
                    10,
                )?),
                max_connections: parse_or(
                    "EPIC_DB_MAX_CONNECTIONS",
                    get("EPIC_DB_MAX_CONNECTIONS"),
                    5,
                )?,
            }),
        };

        Ok(Self {
            host: get("EPIC_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            http_port: parse_or("EPIC_HTTP_PORT", get("EPIC_HTTP_PORT"), 8080)?,
            storage,
            database,
            jwt_secret: require("EPIC_JWT_SECRET")?,
            request_timeout: Duration::from_secs(parse_or(
                "EPIC_REQUEST_TIMEOUT_SECS",
                get("EPIC_REQUEST_TIMEOUT_SECS"),
                15,
            )?),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
