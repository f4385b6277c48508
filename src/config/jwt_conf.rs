use rand::distributions::Alphanumeric;
use rand::Rng;
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::{env_or, ConfigError};

const MIN_SECRET_LEN: usize = 32;
/// One year, in minutes
pub const MAX_ACCESS_TOKEN_EXPIRATION: i64 = 525_600;

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub jwt_secret: String,
    /// Access token expiration time in minutes
    pub access_token_expiration: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: signing secret, at least 32 characters. When unset a random
    ///   secret is generated and tokens do not survive a restart.
    /// - JWT_ACCESS_TOKEN_EXPIRY: Access token expiration in minutes (defaults to 15)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                warn!("JWT_SECRET not set, generating a per-process secret");
                Self::random_secret()
            }
        };
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        let access_token_expiration = env_or::<i64>("JWT_ACCESS_TOKEN_EXPIRY", "15")?;
        debug!("JWT access token expiration: {} minutes", access_token_expiration);

        let config = JwtConfig { jwt_secret, access_token_expiration };
        config.validate()?;
        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            error!("JWT secret is too short (minimum {} characters required)", MIN_SECRET_LEN);
            return Err(ConfigError::InvalidValue(format!(
                "JWT secret must be at least {} characters long",
                MIN_SECRET_LEN
            )));
        }
        if self.access_token_expiration <= 0 {
            error!("Access token expiration must be greater than 0");
            return Err(ConfigError::InvalidValue(
                "Access token expiration must be greater than 0".to_string(),
            ));
        }
        if self.access_token_expiration > MAX_ACCESS_TOKEN_EXPIRATION {
            error!(
                "Access token expiration {} exceeds {} minutes",
                self.access_token_expiration, MAX_ACCESS_TOKEN_EXPIRATION
            );
            return Err(ConfigError::InvalidValue(format!(
                "Access token expiration must be at most {} minutes",
                MAX_ACCESS_TOKEN_EXPIRATION
            )));
        }
        Ok(())
    }

    fn random_secret() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect()
    }
}

/// Create JWT configuration for testing with default values
impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough".to_string(),
            access_token_expiration: 15,
        }
    }
}
