use axum::{
    routing::{get, post},
    Router,
};

use crate::handler::user_handler::{
    list_users_handler, me_handler, signup_handler, user_by_email_handler, validate_user_handler, UserState,
};

pub fn user_router(service: UserState) -> Router {
    Router::new()
        .route("/api/user/signup", post(signup_handler))
        .route("/api/users", get(list_users_handler))
        .route("/api/user/email", get(user_by_email_handler).post(user_by_email_handler))
        .route("/api/user/validate", get(validate_user_handler).post(validate_user_handler))
        .route("/api/user/me", get(me_handler))
        .with_state(service)
}
