pub mod app_conf;
pub mod storage_conf;
pub mod redis_conf;
pub mod mongo_conf;
pub mod jwt_conf;

pub use app_conf::{AppConfig, PutPolicy, StorageBackend};
pub use storage_conf::StorageConfig;
pub use redis_conf::RedisConfig;
pub use mongo_conf::MongoConfig;
pub use jwt_conf::JwtConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Parse an environment variable, falling back to `default` when it is unset.
pub(crate) fn env_or<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| {
        tracing::warn!("{} not set, using default: {}", name, default);
        default.to_string()
    });
    raw.trim().parse::<T>().map_err(|e| {
        tracing::error!("Invalid {} value: {}", name, e);
        ConfigError::ParseError(format!("{}: {}", name, e))
    })
}
