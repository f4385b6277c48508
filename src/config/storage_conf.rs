use std::env;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{env_or, ConfigError};

/// Settings for the file and memory backends
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// JSON file holding the item array
    pub item_file: PathBuf,
    /// JSON file holding the user array
    pub user_file: PathBuf,
    /// Seed the memory backend with the demo catalog
    pub seed_items: bool,
}

impl StorageConfig {
    /// Expected environment variables:
    /// - DATABASE: item file (defaults to data.json)
    /// - FAKEAPI_USR_DATABASE: user file (defaults to users.json)
    /// - FAKEAPI_SEED: seed the memory backend (defaults to false)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading storage configuration from environment variables");

        let item_file = PathBuf::from(env::var("DATABASE").unwrap_or_else(|_| "data.json".to_string()));
        debug!("Item file: {}", item_file.display());

        let user_file = PathBuf::from(
            env::var("FAKEAPI_USR_DATABASE").unwrap_or_else(|_| "users.json".to_string()),
        );
        debug!("User file: {}", user_file.display());

        let seed_items = env_or::<bool>("FAKEAPI_SEED", "false")?;

        let config = StorageConfig { item_file, user_file, seed_items };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.item_file.as_os_str().is_empty() || self.user_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError("Storage file paths cannot be empty".to_string()));
        }
        if self.item_file == self.user_file {
            return Err(ConfigError::ValidationError(
                "Items and users cannot share the same file".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            item_file: PathBuf::from("data.json"),
            user_file: PathBuf::from("users.json"),
            seed_items: false,
        }
    }
}
