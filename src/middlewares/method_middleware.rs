use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::handler::http_handler::hostname;

pub const ALLOWED_METHODS: &str = "OPTIONS, GET, POST, PUT, DELETE, TRACE, PATCH";
const PATH_ERROR_HEADER: HeaderName = HeaderName::from_static("x-fake-api-path-error");
const TRACE_HEADER: HeaderName = HeaderName::from_static("x-fake-api-trace");

/// Answers OPTIONS and TRACE for every path before routing; other methods pass through.
pub async fn method_interceptor(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        info!("[method_interceptor] OPTIONS {}", request.uri().path());
        options_response(&request)
    } else if request.method() == Method::TRACE {
        info!("[method_interceptor] TRACE {}", request.uri().path());
        trace_response(&request)
    } else {
        next.run(request).await
    }
}

/// Path without the leading slash, `None` for the root
fn requested_path(request: &Request) -> Option<&str> {
    let path = request.uri().path().trim_start_matches('/');
    (!path.is_empty()).then_some(path)
}

fn options_response(request: &Request) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    headers.insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=604800"));
    if let Some(value) = requested_path(request).and_then(|p| HeaderValue::from_str(p).ok()) {
        headers.insert(PATH_ERROR_HEADER, value);
    }
    response
}

fn trace_response(request: &Request) -> Response {
    let client_header: Map<String, Value> = request
        .headers()
        .iter()
        .map(|(name, value)| {
            (name.as_str().to_string(), Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()))
        })
        .collect();

    let mut content = json!({ "header": client_header, "hostname": hostname() });
    if let Some(path) = requested_path(request) {
        content["X-Fake-API-path-error"] = Value::String(path.to_string());
    }

    let mut response = (StatusCode::OK, Json(content)).into_response();
    response
        .headers_mut()
        .insert(TRACE_HEADER, HeaderValue::from_static("client header returned"));
    response
}
