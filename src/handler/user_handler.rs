use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::dto::user_dto::{
    CredentialResponse, CredentialsRequest, EmailRequest, SignupRequest, UserResponse, UsersResponse,
};
use crate::service::user_service::UserService;
use crate::util::error::{HandlerError, HandlerErrorKind, ServiceError};
use crate::util::jwt::Claims;
use crate::util::validated_json::ValidatedJson;

pub type UserState = Arc<dyn UserService>;

// POST /api/user/signup
pub async fn signup_handler(
    State(service): State<UserState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[signup_handler] Handler called");
    match service.signup(request).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(user))),
        // a taken email is reported as 406, unlike item ids
        Err(ServiceError::Conflict(msg)) => {
            warn!("[signup_handler] {}", msg);
            Err(HandlerError::new(HandlerErrorKind::NotAcceptable, msg))
        }
        Err(e) => {
            warn!("[signup_handler] Signup failed: {}", e);
            Err(e.into())
        }
    }
}

// GET /api/users
pub async fn list_users_handler(
    State(service): State<UserState>,
    method: Method,
) -> Result<Json<UsersResponse>, HandlerError> {
    info!("[list_users_handler] Handler called ({})", method);
    let users = service.list_users().await?;
    Ok(Json(UsersResponse {
        message: "Users database".to_string(),
        method: method.to_string(),
        users,
    }))
}

// GET/POST /api/user/email
pub async fn user_by_email_handler(
    State(service): State<UserState>,
    ValidatedJson(request): ValidatedJson<EmailRequest>,
) -> Result<Json<UserResponse>, HandlerError> {
    info!("[user_by_email_handler] Handler called");
    let user = service.find_by_email(&request.email).await?;
    Ok(Json(UserResponse { user }))
}

// GET/POST /api/user/validate
pub async fn validate_user_handler(
    State(service): State<UserState>,
    ValidatedJson(request): ValidatedJson<CredentialsRequest>,
) -> Result<Json<CredentialResponse>, HandlerError> {
    info!("[validate_user_handler] Handler called");
    let tokens = service
        .validate_credentials(&request.email, &request.password)
        .await
        .map_err(|e| {
            warn!("[validate_user_handler] Credentials not validated: {}", e);
            e
        })?;
    Ok(Json(CredentialResponse { credential: true, tokens }))
}

// GET /api/user/me
pub async fn me_handler(
    State(service): State<UserState>,
    headers: HeaderMap,
) -> Result<Json<Claims>, HandlerError> {
    info!("[me_handler] Handler called");
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            warn!("[me_handler] Missing Authorization header");
            HandlerError::unauthorized("Missing Authorization header")
        })?;
    let claims = service.authenticate(auth_header)?;
    Ok(Json(claims))
}
