pub mod item_router;
pub mod user_router;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handler::http_handler::{
    api_healthcheck_handler, error_code_handler, healthcheck_handler, method_not_allowed_handler, root_handler,
};
use crate::handler::item_handler::ItemState;
use crate::handler::user_handler::UserState;
use crate::middlewares::method_middleware::method_interceptor;

/// Full application router. OPTIONS and TRACE are answered for any path; anything
/// else that matches no route and method is a 405.
pub fn create_router(item_service: ItemState, user_service: UserState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/healthcheck", get(healthcheck_handler).head(healthcheck_handler))
        .route("/api/healthcheck", get(api_healthcheck_handler).head(api_healthcheck_handler))
        .route("/errorCode/{code}", get(error_code_handler))
        .merge(item_router::item_router(item_service))
        .merge(user_router::user_router(user_service))
        .method_not_allowed_fallback(method_not_allowed_handler)
        .fallback(method_not_allowed_handler)
        .layer(middleware::from_fn(method_interceptor))
        .layer(TraceLayer::new_for_http())
}
