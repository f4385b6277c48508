use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::user::{Role, User};
use crate::util::jwt::IssuedTokens;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 32, message = "fullname must be 1 to 32 characters"))]
    pub fullname: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password cannot be empty"))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialResponse {
    pub credential: bool,
    pub tokens: IssuedTokens,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    pub message: String,
    pub method: String,
    pub users: Vec<User>,
}
