use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::dto::user_dto::SignupRequest;
use crate::model::user::User;
use crate::repository::repository_error::RepositoryError;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::jwt::{Claims, IssuedTokens, JwtTokenUtils};
use crate::util::password::{PasswordError, PasswordUtils, PasswordUtilsImpl};

pub const UNHASHED_PASSWORD_MESSAGE: &str = "Internal database error. Is the password hashed?";

#[async_trait]
pub trait UserService: Send + Sync {
    /// Stores a new user with a hashed password. A taken email is a `Conflict`.
    async fn signup(&self, request: SignupRequest) -> Result<User, ServiceError>;
    async fn list_users(&self) -> Result<Vec<User>, ServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<User, ServiceError>;
    async fn validate_credentials(&self, email: &str, password: &str) -> Result<IssuedTokens, ServiceError>;
    /// Claims of the bearer token in an Authorization header value
    fn authenticate(&self, auth_header: &str) -> Result<Claims, ServiceError>;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
}

impl UserServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>, jwt_utils: Arc<dyn JwtTokenUtils>) -> Self {
        Self { user_repo, jwt_utils }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, request), fields(email = %request.email, role = request.role.as_str()))]
    async fn signup(&self, request: SignupRequest) -> Result<User, ServiceError> {
        let password = PasswordUtilsImpl::hash_password(&request.password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        let user = User {
            id: Uuid::new_v4().simple().to_string(),
            fullname: request.fullname,
            email: request.email,
            password,
            role: request.role,
        };

        match self.user_repo.insert(user).await {
            Ok(user) => {
                info!("User registered");
                Ok(user)
            }
            Err(RepositoryError::AlreadyExists(_)) => {
                warn!("Email already registered");
                Err(ServiceError::Conflict("Email already exists, adding user failed".to_string()))
            }
            Err(e) => {
                error!("Failed to insert user: {}", e);
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.user_repo.list_all().await?)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<User, ServiceError> {
        self.user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User with email {} was not found", email)))
    }

    #[instrument(skip(self, password))]
    async fn validate_credentials(&self, email: &str, password: &str) -> Result<IssuedTokens, ServiceError> {
        let user = self.find_by_email(email).await?;

        match PasswordUtilsImpl::verify_password(password, &user.password) {
            Ok(true) => {}
            Ok(false) => {
                warn!("Invalid credentials");
                return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
            }
            Err(PasswordError::InvalidHashFormat) => {
                error!("Stored password for {} is not a hash", email);
                return Err(ServiceError::InternalError(UNHASHED_PASSWORD_MESSAGE.to_string()));
            }
            Err(e) => return Err(ServiceError::InternalError(e.to_string())),
        }

        let tokens = self
            .jwt_utils
            .issue_tokens(&user.id, &user.email, user.role.as_str())
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;
        info!("Credentials validated");
        Ok(tokens)
    }

    fn authenticate(&self, auth_header: &str) -> Result<Claims, ServiceError> {
        let token = self
            .jwt_utils
            .extract_token_from_header(auth_header)
            .map_err(|e| ServiceError::Unauthorized(e.to_string()))?;
        self.jwt_utils
            .validate_access_token(&token)
            .map_err(|e| ServiceError::Unauthorized(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::model::user::Role;
    use crate::repository::memory_store::MemoryStore;
    use crate::util::jwt::JwtTokenUtilsImpl;

    fn service_with(users: Vec<User>) -> UserServiceImpl {
        UserServiceImpl::new(
            Arc::new(MemoryStore::with_records(users)),
            Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default())),
        )
    }

    fn signup_request(email: &str) -> SignupRequest {
        SignupRequest {
            fullname: "Ada Lovelace".to_string(),
            email: email.to_string(),
            password: "Password3".to_string(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn test_signup_stores_hash_not_plaintext() {
        let service = service_with(Vec::new());
        let user = service.signup(signup_request("ada@example.com")).await.unwrap();
        assert!(user.password.starts_with("$argon2"));
        assert_eq!(user.id.len(), 32);
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_conflicts() {
        let service = service_with(Vec::new());
        service.signup(signup_request("ada@example.com")).await.unwrap();
        let second = service.signup(signup_request("ada@example.com")).await;
        assert!(matches!(second, Err(ServiceError::Conflict(_))));
        assert_eq!(service.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validate_credentials_outcomes() {
        let service = service_with(Vec::new());
        service.signup(signup_request("ada@example.com")).await.unwrap();

        let tokens = service.validate_credentials("ada@example.com", "Password3").await.unwrap();
        let claims = service.authenticate(&format!("Bearer {}", tokens.access_token)).unwrap();
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, "admin");

        assert!(matches!(
            service.validate_credentials("ada@example.com", "wrong").await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            service.validate_credentials("nobody@example.com", "Password3").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_plaintext_stored_password_is_reported() {
        let service = service_with(vec![User {
            id: "1".to_string(),
            fullname: "Legacy".to_string(),
            email: "legacy@example.com".to_string(),
            password: "Password1".to_string(),
            role: Role::Ops,
        }]);
        let result = service.validate_credentials("legacy@example.com", "Password1").await;
        match result {
            Err(ServiceError::InternalError(msg)) => assert_eq!(msg, UNHASHED_PASSWORD_MESSAGE),
            other => panic!("unexpected result: {:?}", other.map(|t| t.token_type)),
        }
    }
}
