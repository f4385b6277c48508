use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::JwtConfig;

const ACCESS: &str = "access";

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
    /// Unique per token
    pub jti: String,
}

/// Tokens returned after a successful credential check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedTokens {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode JWT token: {0}")]
    EncodingFailed(String),
    #[error("Failed to decode JWT token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
    #[error("Invalid token type: expected {expected}, got {actual}")]
    InvalidTokenType { expected: String, actual: String },
}

pub trait JwtTokenUtils: Send + Sync {
    fn issue_tokens(&self, user_id: &str, email: &str, role: &str) -> Result<IssuedTokens, JwtError>;
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError>;
    /// Strips the `Bearer ` scheme from an Authorization header value
    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError>;
}

#[derive(Debug, Clone)]
pub struct JwtTokenUtilsImpl {
    pub jwt_config: JwtConfig,
}

impl JwtTokenUtilsImpl {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtTokenUtilsImpl { jwt_config }
    }

    fn generate_access_token(&self, user_id: &str, email: &str, role: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = Duration::try_minutes(self.jwt_config.access_token_expiration)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                JwtError::EncodingFailed(format!(
                    "access token lifetime of {} minutes is out of range",
                    self.jwt_config.access_token_expiration
                ))
            })?;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            token_type: ACCESS.to_string(),
            jti: Uuid::new_v4().to_string(),
        };

        let encoding_key = EncodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
            .map_err(|err| JwtError::EncodingFailed(err.to_string()))
    }
}

impl JwtTokenUtils for JwtTokenUtilsImpl {
    fn issue_tokens(&self, user_id: &str, email: &str, role: &str) -> Result<IssuedTokens, JwtError> {
        let access_token = self.generate_access_token(user_id, email, role)?;
        info!("Issued access token for user: {}", user_id);
        Ok(IssuedTokens {
            access_token,
            expires_in: self.jwt_config.access_token_expiration.saturating_mul(60),
            token_type: "Bearer".to_string(),
        })
    }

    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        let claims = match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(err) => {
                return Err(match err.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        debug!("Token has expired");
                        JwtError::TokenExpired
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => JwtError::InvalidToken,
                    _ => {
                        warn!("Token validation failed: {}", err);
                        JwtError::DecodingFailed(err.to_string())
                    }
                })
            }
        };

        if claims.token_type != ACCESS {
            return Err(JwtError::InvalidTokenType {
                expected: ACCESS.to_string(),
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }

    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError> {
        match auth_header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => {
                debug!("Authorization header is not a bearer token");
                Err(JwtError::InvalidToken)
            }
        }
    }
}
