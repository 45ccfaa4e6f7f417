use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rolegate_core::AppError;
use tracing_subscriber::EnvFilter;

const DEFAULT_SERVICE_HOST: &str = "0.0.0.0";
const DEFAULT_SERVICE_PORT: u16 = 9000;
const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;
const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;
const DEFAULT_CACHE_TIMEOUT_MS: u64 = 100;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleStoreConfig {
    /// Seeded in-process store. Without a seed file the development seed is used.
    Memory { seed_file: Option<PathBuf> },
    /// PostgreSQL store. A seed file, when given, is upserted at startup.
    Postgres {
        database_url: String,
        seed_file: Option<PathBuf>,
    },
}

impl RoleStoreConfig {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Memory { .. } => "memory",
            Self::Postgres { .. } => "postgres",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCacheConfig {
    Redis {
        redis_url: String,
        operation_timeout: Duration,
    },
    Memory {
        max_entries: u64,
    },
    Disabled,
}

impl RoleCacheConfig {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Redis { .. } => "redis",
            Self::Memory { .. } => "memory",
            Self::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub service_host: String,
    pub service_port: u16,
    pub cache_ttl: Duration,
    pub store_timeout: Duration,
    pub role_store: RoleStoreConfig,
    pub role_cache: RoleCacheConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let service_host =
            optional("SERVICE_HOST").unwrap_or_else(|| DEFAULT_SERVICE_HOST.to_owned());
        let service_port =
            parse_or_default("SERVICE_PORT", optional("SERVICE_PORT"), DEFAULT_SERVICE_PORT)?;

        let cache_ttl_seconds = parse_or_default(
            "REDIS_TTL",
            optional("REDIS_TTL"),
            DEFAULT_CACHE_TTL_SECONDS,
        )?;
        let store_timeout_ms = parse_or_default(
            "ROLE_STORE_TIMEOUT_MS",
            optional("ROLE_STORE_TIMEOUT_MS"),
            DEFAULT_STORE_TIMEOUT_MS,
        )?;
        if store_timeout_ms == 0 {
            return Err(AppError::Validation(
                "ROLE_STORE_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        let role_store = match optional("ROLE_STORE").as_deref().unwrap_or("memory") {
            "memory" => RoleStoreConfig::Memory {
                seed_file: optional("ROLE_SEED_FILE").map(PathBuf::from),
            },
            "postgres" => RoleStoreConfig::Postgres {
                database_url: optional("DATABASE_URL").ok_or_else(|| {
                    AppError::Validation(
                        "DATABASE_URL is required when ROLE_STORE is 'postgres'".to_owned(),
                    )
                })?,
                seed_file: optional("ROLE_SEED_FILE").map(PathBuf::from),
            },
            other => {
                return Err(AppError::Validation(format!(
                    "ROLE_STORE must be either 'memory' or 'postgres', got '{other}'"
                )));
            }
        };

        let redis_url = optional("REDIS_URL");
        let default_backend = if redis_url.is_some() {
            "redis"
        } else {
            "disabled"
        };
        let role_cache = match optional("ROLE_CACHE_BACKEND")
            .as_deref()
            .unwrap_or(default_backend)
        {
            "redis" => {
                let operation_timeout_ms = parse_or_default(
                    "ROLE_CACHE_TIMEOUT_MS",
                    optional("ROLE_CACHE_TIMEOUT_MS"),
                    DEFAULT_CACHE_TIMEOUT_MS,
                )?;
                RoleCacheConfig::Redis {
                    redis_url: redis_url.ok_or_else(|| {
                        AppError::Validation(
                            "REDIS_URL is required when ROLE_CACHE_BACKEND is 'redis'".to_owned(),
                        )
                    })?,
                    operation_timeout: Duration::from_millis(operation_timeout_ms),
                }
            }
            "memory" => RoleCacheConfig::Memory {
                max_entries: parse_or_default(
                    "ROLE_CACHE_MAX_ENTRIES",
                    optional("ROLE_CACHE_MAX_ENTRIES"),
                    DEFAULT_CACHE_MAX_ENTRIES,
                )?,
            },
            "disabled" => RoleCacheConfig::Disabled,
            other => {
                return Err(AppError::Validation(format!(
                    "ROLE_CACHE_BACKEND must be one of 'redis', 'memory' or 'disabled', got '{other}'"
                )));
            }
        };

        Ok(Self {
            service_host,
            service_port,
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
            store_timeout: Duration::from_millis(store_timeout_ms),
            role_store,
            role_cache,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.service_host).map_err(|error| {
            AppError::Validation(format!(
                "invalid SERVICE_HOST '{}': {error}",
                self.service_host
            ))
        })?;
        Ok(SocketAddr::from((host, self.service_port)))
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `LOG_LEVEL`.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| {
            env::var("LOG_LEVEL")
                .ok()
                .and_then(|level| EnvFilter::try_new(level.trim().to_ascii_lowercase()).ok())
        })
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_or_default<T>(name: &str, value: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}"))),
        None => Ok(default),
    }
}
