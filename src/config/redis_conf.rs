use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::{env_or, ConfigError};

/// Connection settings for the key/value backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: u8,
    pub connection_timeout_secs: u64,
    pub command_timeout_secs: u64,
    pub use_tls: bool,
}

impl RedisConfig {
    /// Load Redis configuration from environment variables
    ///
    /// Expected environment variables:
    /// - REDIS_HOSTNAME: Redis server host (defaults to "localhost")
    /// - REDIS_PORT: Redis server port (defaults to 6379)
    /// - REDIS_USERNAME / REDIS_PASSWORD: optional credentials
    /// - REDIS_DATABASE: Database number (defaults to 0)
    /// - REDIS_CONNECTION_TIMEOUT: seconds (defaults to 5)
    /// - REDIS_COMMAND_TIMEOUT: seconds (defaults to 5)
    /// - REDIS_USE_TLS: rediss:// instead of redis:// (defaults to false)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading Redis configuration from environment variables");

        let host = env::var("REDIS_HOSTNAME").unwrap_or_else(|_| {
            warn!("REDIS_HOSTNAME not set, using default: localhost");
            "localhost".to_string()
        });
        let port = env_or::<u16>("REDIS_PORT", "6379")?;
        debug!("Redis server: {}:{}", host, port);

        let username = env::var("REDIS_USERNAME").ok();
        let password = env::var("REDIS_PASSWORD").ok();
        if let Some(ref pass) = password {
            debug!("Redis password provided (length: {} chars)", pass.len());
        }

        let database = env_or::<u8>("REDIS_DATABASE", "0")?;
        let connection_timeout_secs = env_or::<u64>("REDIS_CONNECTION_TIMEOUT", "5")?;
        let command_timeout_secs = env_or::<u64>("REDIS_COMMAND_TIMEOUT", "5")?;
        let use_tls = env_or::<bool>("REDIS_USE_TLS", "false")?;
        debug!(
            "Redis database: {}, connect timeout: {}s, command timeout: {}s, TLS: {}",
            database, connection_timeout_secs, command_timeout_secs, use_tls
        );

        let config = Self {
            host,
            port,
            username,
            password,
            database,
            connection_timeout_secs,
            command_timeout_secs,
            use_tls,
        };

        config.validate()?;
        info!("Redis configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            error!("Redis host is empty");
            return Err(ConfigError::ValidationError("Host cannot be empty".to_string()));
        }
        if self.port == 0 {
            error!("Redis port is 0");
            return Err(ConfigError::ValidationError("Port must be greater than 0".to_string()));
        }
        if self.database > 15 {
            warn!("Redis database number is high: {} (Redis default max is 15)", self.database);
        }
        if self.connection_timeout_secs == 0 || self.command_timeout_secs == 0 {
            error!("Redis timeouts must be positive");
            return Err(ConfigError::ValidationError("Timeouts must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Connection URL, credentials included
    pub fn get_connection_url(&self) -> String {
        let protocol = if self.use_tls { "rediss" } else { "redis" };
        let auth_part = match (&self.username, &self.password) {
            (Some(username), Some(password)) => format!("{}:{}@", username, password),
            (None, Some(password)) => format!(":{}@", password),
            _ => String::new(),
        };
        format!("{}://{}{}:{}/{}", protocol, auth_part, self.host, self.port, self.database)
    }

    /// `host:port`, safe to log
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            username: None,
            password: None,
            database: 0,
            connection_timeout_secs: 5,
            command_timeout_secs: 5,
            use_tls: false,
        }
    }
}
