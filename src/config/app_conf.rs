use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, error, info};

use crate::config::{env_or, ConfigError};

/// Which store backs the item and user collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    File,
    Redis,
    Mongo,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" | "json" => Ok(StorageBackend::File),
            "redis" => Ok(StorageBackend::Redis),
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            other => Err(ConfigError::InvalidValue(format!("Unknown storage backend: {}", other))),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageBackend::Memory => "memory",
            StorageBackend::File => "file",
            StorageBackend::Redis => "redis",
            StorageBackend::Mongo => "mongo",
        };
        write!(f, "{}", s)
    }
}

/// What PUT does when the target item does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutPolicy {
    /// Create the item and answer 201
    Upsert,
    /// Reject with 404
    Strict,
}

impl FromStr for PutPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upsert" | "create" => Ok(PutPolicy::Upsert),
            "strict" | "reject" => Ok(PutPolicy::Strict),
            other => Err(ConfigError::InvalidValue(format!("Unknown PUT policy: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub tls_cert: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
    pub backend: StorageBackend,
    pub put_policy: PutPolicy,
}

impl AppConfig {
    /// Load the server configuration from environment variables
    ///
    /// Expected environment variables:
    /// - FAKEAPI_HOST: interface to listen on (defaults to 0.0.0.0)
    /// - FAKEAPI_PORT: TCP port (defaults to 8000)
    /// - FAKEAPI_CRT / FAKEAPI_PKEY: TLS certificate and key, both or neither
    /// - FAKEAPI_BACKEND: memory, file, redis or mongo (defaults to file)
    /// - FAKEAPI_PUT_POLICY: upsert or strict (defaults to upsert)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading application configuration from environment variables");

        let host = env::var("FAKEAPI_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        debug!("Listen host: {}", host);

        let port = env_or::<u16>("FAKEAPI_PORT", "8000")?;
        debug!("Listen port: {}", port);

        let tls_cert = env::var("FAKEAPI_CRT").ok().filter(|s| !s.is_empty()).map(PathBuf::from);
        let tls_key = env::var("FAKEAPI_PKEY").ok().filter(|s| !s.is_empty()).map(PathBuf::from);

        let backend = env::var("FAKEAPI_BACKEND")
            .unwrap_or_else(|_| "file".to_string())
            .parse::<StorageBackend>()?;
        debug!("Storage backend: {}", backend);

        let put_policy = env::var("FAKEAPI_PUT_POLICY")
            .unwrap_or_else(|_| "upsert".to_string())
            .parse::<PutPolicy>()?;
        debug!("PUT policy: {:?}", put_policy);

        let config = AppConfig { host, port, tls_cert, tls_key, backend, put_policy };
        config.validate()?;
        info!("Application configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            error!("Listen host is empty");
            return Err(ConfigError::ValidationError("FAKEAPI_HOST cannot be empty".to_string()));
        }
        match (&self.tls_cert, &self.tls_key) {
            (Some(_), None) | (None, Some(_)) => {
                error!("Only one of FAKEAPI_CRT / FAKEAPI_PKEY is set");
                Err(ConfigError::ValidationError(
                    "FAKEAPI_CRT and FAKEAPI_PKEY must be set together".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// TLS certificate and key, when HTTPS is configured
    pub fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key)) => Some((cert, key)),
            _ => None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            tls_cert: None,
            tls_key: None,
            backend: StorageBackend::File,
            put_policy: PutPolicy::Upsert,
        }
    }
}
