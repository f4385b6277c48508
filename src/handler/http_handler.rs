use axum::{
    extract::Path,
    http::{HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use crate::util::error::{HandlerError, HandlerErrorKind, ERROR_HEADER};

const API_HEADER: HeaderName = HeaderName::from_static("x-fake-api");
const METHOD_HEADER: HeaderName = HeaderName::from_static("x-method");

pub fn hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}

// GET/HEAD /
pub async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({ "message": "Root of Fake REST API", "hostname": hostname() }))
}

fn health_body() -> Json<serde_json::Value> {
    Json(json!({ "Health": "OK", "PID": std::process::id(), "hostname": hostname() }))
}

// GET/HEAD /healthcheck
pub async fn healthcheck_handler(method: Method) -> Response {
    if method == Method::HEAD {
        StatusCode::NO_CONTENT.into_response()
    } else {
        health_body().into_response()
    }
}

// GET/HEAD /api/healthcheck
pub async fn api_healthcheck_handler(method: Method) -> Response {
    let mut response = healthcheck_handler(method.clone()).await;
    let headers = response.headers_mut();
    headers.insert(API_HEADER, HeaderValue::from_static("/api/healthcheck"));
    if let Ok(value) = HeaderValue::from_str(&format!("Method was {}", method)) {
        headers.insert(METHOD_HEADER, value);
    }
    response
}

/// Replies with the status code named in the path
// GET /errorCode/{code}
pub async fn error_code_handler(Path(code): Path<String>) -> Result<Response, HandlerError> {
    info!("[error_code_handler] Handler called with code {}", code);
    let status = code
        .parse::<u16>()
        .ok()
        .filter(|c| (200..=599).contains(c))
        .and_then(|c| StatusCode::from_u16(c).ok())
        .ok_or_else(|| {
            warn!("[error_code_handler] Unusable status code {}", code);
            HandlerError::validation(format!("'{}' is not a status code between 200 and 599", code))
        })?;

    let message = format!("Error code {} from {}", status.as_u16(), hostname());
    let mut response = (status, Json(json!({ "code": status.as_u16(), "message": message }))).into_response();
    if let Ok(value) = HeaderValue::from_str(&message) {
        response.headers_mut().insert(ERROR_HEADER, value);
    }
    Ok(response)
}

/// Unmatched paths and unsupported methods
pub async fn method_not_allowed_handler(method: Method, uri: axum::http::Uri) -> HandlerError {
    warn!("[method_not_allowed_handler] {} {}", method, uri.path());
    HandlerError::new(HandlerErrorKind::MethodNotAllowed, "Method Not Allowed")
        .with_details(format!("{} {}", method, uri.path()))
}
