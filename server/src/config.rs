//! Startup configuration.
//!
//! Built on `figment`, merged lowest to highest: built-in defaults, the JSON
//! file named by `TODO_CONFIG`, then the process environment (which includes
//! anything `dotenvy` loaded from `.env`). The JSON file is a nested object
//! whose paths match the keys below:
//!
//! ```json
//! { "service": { "type": "jdbc" }, "url": "postgres://localhost/todo", "http": { "port": 8082 } }
//! ```
//!
//! | Env var | JSON key | Default |
//! |---|---|---|
//! | `SERVICE_TYPE` | `service.type` | `redis` |
//! | `REDIS_HOST` | `redis.host` | `127.0.0.1` |
//! | `REDIS_PORT` | `redis.port` | `6379` |
//! | `REDIS_KEY` | `redis.key` | `VERT_TODO` |
//! | `DATABASE_URL` | `jdbc.url`, `url` | required for `jdbc` |
//! | `DATABASE_MAX_CONNECTIONS` | `jdbc.max_pool_size`, `max_pool_size` | `5` |
//! | `HOST` | `http.host` | `0.0.0.0` |
//! | `PORT` | `http.port` | `8082` |

use std::env;
use std::fmt;
use std::str::FromStr;

use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8082;
pub const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
pub const DEFAULT_REDIS_PORT: u16 = 6379;
pub const DEFAULT_REDIS_KEY: &str = "VERT_TODO";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_FILE_VAR: &str = "TODO_CONFIG";

/// Environment variables read as configuration.
const ENV_KEYS: [&str; 8] = [
    "SERVICE_TYPE",
    "REDIS_HOST",
    "REDIS_PORT",
    "REDIS_KEY",
    "DATABASE_URL",
    "DATABASE_MAX_CONNECTIONS",
    "HOST",
    "PORT",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown service type '{0}' (expected redis, jdbc or memory)")]
    InvalidServiceType(String),

    #[error("DATABASE_URL (or 'url' in the config file) is required for the jdbc service")]
    MissingDatabaseUrl,

    #[error(transparent)]
    Figment(#[from] figment::Error),
}

/// Which storage backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceType {
    #[default]
    Redis,
    Jdbc,
    Memory,
}

impl FromStr for ServiceType {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "jdbc" | "sql" | "relational" => Ok(Self::Jdbc),
            "memory" | "in_memory" | "inmemory" => Ok(Self::Memory),
            _ => Err(ConfigError::InvalidServiceType(value.to_string())),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Redis => "redis",
            Self::Jdbc => "jdbc",
            Self::Memory => "memory",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    /// Name of the hash holding every todo.
    pub key: String,
}

impl RedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_REDIS_HOST.to_string(),
            port: DEFAULT_REDIS_PORT,
            key: DEFAULT_REDIS_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JdbcConfig {
    /// sqlx connection URL, e.g. `postgres://user@host/db` or `sqlite://todo.db`.
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Redis(RedisConfig),
    Jdbc(JdbcConfig),
    Memory,
}

impl StoreConfig {
    pub fn service_type(&self) -> ServiceType {
        match self {
            Self::Redis(_) => ServiceType::Redis,
            Self::Jdbc(_) => ServiceType::Jdbc,
            Self::Memory => ServiceType::Memory,
        }
    }
}

/// Raw layered settings, shaped like the JSON file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Settings {
    service: ServiceSettings,
    redis: RedisConfig,
    jdbc: JdbcSettings,
    http: HttpSettings,
    /// Top-level spellings of `jdbc.url` and `jdbc.max_pool_size`.
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_pool_size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct ServiceSettings {
    #[serde(rename = "type")]
    kind: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            kind: ServiceType::default().to_string(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct JdbcSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_pool_size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct HttpSettings {
    host: String,
    port: u16,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    fn into_config(self) -> Result<Config, ConfigError> {
        let store = match self.service.kind.parse::<ServiceType>()? {
            ServiceType::Redis => StoreConfig::Redis(self.redis),
            ServiceType::Jdbc => {
                let url = self
                    .jdbc
                    .url
                    .or(self.url)
                    .filter(|url| !url.trim().is_empty())
                    .ok_or(ConfigError::MissingDatabaseUrl)?;
                let url = url.trim();
                StoreConfig::Jdbc(JdbcConfig {
                    url: url.strip_prefix("jdbc:").unwrap_or(url).to_string(),
                    max_connections: self
                        .jdbc
                        .max_pool_size
                        .or(self.max_pool_size)
                        .unwrap_or(DEFAULT_MAX_CONNECTIONS),
                })
            }
            ServiceType::Memory => StoreConfig::Memory,
        };

        Ok(Config {
            store,
            host: self.http.host,
            port: self.http.port,
        })
    }
}

/// Map an environment variable name onto its path in [`Settings`].
fn env_key_path(key: &str) -> &'static str {
    match key.to_ascii_uppercase().as_str() {
        "SERVICE_TYPE" => "service.type",
        "REDIS_HOST" => "redis.host",
        "REDIS_PORT" => "redis.port",
        "REDIS_KEY" => "redis.key",
        "DATABASE_URL" => "jdbc.url",
        "DATABASE_MAX_CONNECTIONS" => "jdbc.max_pool_size",
        "HOST" => "http.host",
        "PORT" => "http.port",
        _ => "unused",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store: StoreConfig,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::Redis(RedisConfig::default()),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load from the process environment and the optional `TODO_CONFIG` file.
    pub fn load() -> Result<Self, ConfigError> {
        let file = env::var(CONFIG_FILE_VAR)
            .ok()
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty());
        Self::from_figment(&Self::figment(file.as_deref()))
    }

    /// Every configuration source in precedence order, lowest first.
    pub fn figment(config_file: Option<&str>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Json::file(path));
        }
        figment.merge(
            Env::raw()
                .only(&ENV_KEYS)
                .map(|key| env_key_path(key.as_str()).into()),
        )
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let settings: Settings = figment.extract()?;
        settings.into_config()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
