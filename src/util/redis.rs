use crate::config::RedisConfig;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, FromRedisValue, Script};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);
const SCAN_BATCH: usize = 100;

/// Shared Redis connection with bounded retries on connection failures
#[derive(Clone)]
pub struct RedisService {
    connection_manager: ConnectionManager,
    config: RedisConfig,
}

impl RedisService {
    #[instrument(skip(config), fields(host = %config.host, port = config.port, db = config.database))]
    pub async fn new(config: RedisConfig) -> Result<Self, RedisError> {
        info!("Initializing Redis service");

        config.validate().map_err(|e| {
            error!("Redis configuration validation failed: {}", e);
            RedisError::ConfigError(e.to_string())
        })?;

        let client = Client::open(config.get_connection_url()).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            RedisError::ConnectionError(format!("Client creation failed: {}", e))
        })?;

        let connection_manager =
            match tokio::time::timeout(config.connection_timeout(), ConnectionManager::new(client)).await {
                Ok(Ok(manager)) => manager,
                Ok(Err(e)) => {
                    error!("Failed to connect to Redis at {}: {}", config.endpoint(), e);
                    return Err(RedisError::ConnectionError(format!("{}: {}", config.endpoint(), e)));
                }
                Err(_) => {
                    error!("Timed out connecting to Redis at {}", config.endpoint());
                    return Err(RedisError::TimeoutError(format!(
                        "no connection to {} after {:?}",
                        config.endpoint(),
                        config.connection_timeout()
                    )));
                }
            };

        let service = Self { connection_manager, config };
        service.ping().await?;

        info!("Redis service initialized successfully");
        Ok(service)
    }

    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), RedisError> {
        let reply: String = self
            .with_retry("PING", |mut conn| async move { redis::cmd("PING").query_async(&mut conn).await })
            .await?;
        if reply == "PONG" {
            debug!("Redis ping successful");
            Ok(())
        } else {
            error!("Unexpected ping response: {}", reply);
            Err(RedisError::OperationError(format!("Unexpected ping response: {}", reply)))
        }
    }

    /// Run a Lua script atomically on the server
    pub async fn eval<T>(&self, script: &Script, keys: &[String], args: &[String]) -> Result<T, RedisError>
    where
        T: FromRedisValue + Send,
    {
        self.with_retry("EVAL", |mut conn| {
            let mut invocation = script.prepare_invoke();
            for key in keys {
                invocation.key(key);
            }
            for arg in args {
                invocation.arg(arg);
            }
            async move { invocation.invoke_async(&mut conn).await }
        })
        .await
    }

    pub async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, RedisError> {
        self.with_retry("HGETALL", |mut conn| async move { conn.hgetall(key).await }).await
    }

    /// All keys matching `pattern`, collected with SCAN
    pub async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, RedisError> {
        self.with_retry("SCAN", |mut conn| async move {
            let mut keys = Vec::new();
            let mut cursor: u64 = 0;
            loop {
                let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query_async(&mut conn)
                    .await?;
                keys.extend(batch);
                if next == 0 {
                    break;
                }
                cursor = next;
            }
            Ok(keys)
        })
        .await
    }

    /// Retries connection failures and timeouts; any other error is returned at once.
    async fn with_retry<T, F, Fut>(&self, operation: &str, mut f: F) -> Result<T, RedisError>
    where
        F: FnMut(ConnectionManager) -> Fut,
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        let mut attempt = 1;
        loop {
            let conn = self.connection_manager.clone();
            let failure = match tokio::time::timeout(self.config.command_timeout(), f(conn)).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if is_connection_error(&e) => RedisError::ConnectionError(e.to_string()),
                Ok(Err(e)) => {
                    error!("Redis {} failed: {}", operation, e);
                    return Err(RedisError::OperationError(format!("{} failed: {}", operation, e)));
                }
                Err(_) => RedisError::TimeoutError(format!(
                    "{} exceeded {:?}",
                    operation,
                    self.config.command_timeout()
                )),
            };

            if attempt >= MAX_ATTEMPTS {
                error!("Redis {} gave up after {} attempts: {}", operation, attempt, failure);
                return Err(failure);
            }
            warn!("Redis {} attempt {} failed ({}), retrying in {:?}", operation, attempt, failure, RETRY_BACKOFF);
            tokio::time::sleep(RETRY_BACKOFF).await;
            attempt += 1;
        }
    }
}

fn is_connection_error(e: &redis::RedisError) -> bool {
    e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout()
}

#[derive(Debug, thiserror::Error)]
pub enum RedisError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Operation error: {0}")]
    OperationError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),
}
