use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info};

use crate::config::{env_or, ConfigError};

/// MongoDB configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// MongoDB connection URI
    pub uri: String,
    /// Database name
    pub database: String,
    /// Collection holding the items
    pub item_collection: String,
    /// Collection holding the users
    pub user_collection: String,
    /// Connection pool size
    pub pool_size: u32,
    /// Connection and server selection timeout in seconds
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// Load MongoDB configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MONGO_DB_URI: MongoDB connection URI (required)
    /// - MONGO_INITDB_DATABASE: Database name (required)
    /// - MONGO_INITDB_COLLECTION: item collection (defaults to "items")
    /// - MONGO_USER_COLLECTION: user collection (defaults to "users")
    /// - MONGO_POOL_SIZE: Connection pool size (defaults to 10)
    /// - MONGO_DB_TIMEOUT: timeout in seconds (defaults to 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration from environment variables");

        let uri = env::var("MONGO_DB_URI").map_err(|_| {
            error!("MONGO_DB_URI environment variable not found");
            ConfigError::EnvVarNotFound("MONGO_DB_URI".to_string())
        })?;

        let database = env::var("MONGO_INITDB_DATABASE").map_err(|_| {
            error!("MONGO_INITDB_DATABASE environment variable not found");
            ConfigError::EnvVarNotFound("MONGO_INITDB_DATABASE".to_string())
        })?;
        debug!("MongoDB database: {}", database);

        let item_collection = env::var("MONGO_INITDB_COLLECTION").unwrap_or_else(|_| "items".to_string());
        let user_collection = env::var("MONGO_USER_COLLECTION").unwrap_or_else(|_| "users".to_string());
        debug!("MongoDB collections: items={}, users={}", item_collection, user_collection);

        let pool_size = env_or::<u32>("MONGO_POOL_SIZE", "10")?;
        let connection_timeout_secs = env_or::<u64>("MONGO_DB_TIMEOUT", "5")?;
        debug!("MongoDB pool size: {}, timeout: {} seconds", pool_size, connection_timeout_secs);

        let config = MongoConfig {
            uri,
            database,
            item_collection,
            user_collection,
            pool_size,
            connection_timeout_secs,
        };

        config.validate()?;
        info!("MongoDB configuration loaded successfully");
        Ok(config)
    }

    /// Create MongoConfig for testing
    pub fn from_test_env() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "test_db".to_string(),
            item_collection: "test_items".to_string(),
            user_collection: "test_users".to_string(),
            pool_size: 2,
            connection_timeout_secs: 2,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uri.is_empty() {
            error!("MongoDB URI is empty");
            return Err(ConfigError::ValidationError("MongoDB URI cannot be empty".to_string()));
        }
        if self.database.is_empty() {
            error!("MongoDB database is empty");
            return Err(ConfigError::ValidationError("MongoDB database cannot be empty".to_string()));
        }
        if self.item_collection.is_empty() || self.user_collection.is_empty() {
            error!("MongoDB collection name is empty");
            return Err(ConfigError::ValidationError("MongoDB collection names cannot be empty".to_string()));
        }
        if self.item_collection == self.user_collection {
            return Err(ConfigError::ValidationError(
                "Items and users cannot share a collection".to_string(),
            ));
        }
        if self.pool_size == 0 {
            error!("MongoDB pool size is 0");
            return Err(ConfigError::ValidationError("MongoDB pool size must be greater than 0".to_string()));
        }
        if self.connection_timeout_secs == 0 {
            error!("MongoDB connection timeout is 0");
            return Err(ConfigError::ValidationError("MongoDB connection timeout must be greater than 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_config() {
        let config = MongoConfig::from_test_env();
        assert_eq!(config.database, "test_db");
        assert_eq!(config.item_collection, "test_items");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_uri() {
        let mut config = MongoConfig::from_test_env();
        config.uri = "".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_shared_collection() {
        let mut config = MongoConfig::from_test_env();
        config.user_collection = config.item_collection.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_pool_size() {
        let mut config = MongoConfig::from_test_env();
        config.pool_size = 0;
        assert!(config.validate().is_err());
    }
}
