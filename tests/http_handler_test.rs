mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{memory_app, send, send_request};
use fake_rest_api::config::PutPolicy;

#[tokio::test]
async fn test_root_and_healthcheck() {
    let app = memory_app(PutPolicy::Upsert, Vec::new());

    let root = send(&app, "GET", "/", None).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.body["message"], "Root of Fake REST API");
    assert!(root.body["hostname"].is_string());

    let health = send(&app, "GET", "/healthcheck", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["Health"], "OK");
    assert_eq!(health.body["PID"], std::process::id());

    let head = send(&app, "HEAD", "/healthcheck", None).await;
    assert_eq!(head.status, StatusCode::NO_CONTENT);
    assert!(head.raw.is_empty());

    let root_head = send(&app, "HEAD", "/", None).await;
    assert_eq!(root_head.status, StatusCode::OK);
}

#[tokio::test]
async fn test_api_healthcheck_reports_method() {
    let app = memory_app(PutPolicy::Upsert, Vec::new());

    let get = send(&app, "GET", "/api/healthcheck", None).await;
    assert_eq!(get.status, StatusCode::OK);
    assert_eq!(get.body["Health"], "OK");
    assert_eq!(get.headers.get("x-fake-api").unwrap(), "/api/healthcheck");
    assert_eq!(get.headers.get("x-method").unwrap(), "Method was GET");

    let head = send(&app, "HEAD", "/api/healthcheck", None).await;
    assert_eq!(head.status, StatusCode::NO_CONTENT);
    assert_eq!(head.headers.get("x-method").unwrap(), "Method was HEAD");
}

#[tokio::test]
async fn test_error_code_echoes_requested_status() {
    let app = memory_app(PutPolicy::Upsert, Vec::new());

    let teapot = send(&app, "GET", "/errorCode/418", None).await;
    assert_eq!(teapot.status, StatusCode::IM_A_TEAPOT);
    assert_eq!(teapot.body["code"], 418);
    let header = teapot.headers.get("x-fake-rest-api").unwrap().to_str().unwrap();
    assert!(header.starts_with("Error code 418 from "));

    let unavailable = send(&app, "GET", "/errorCode/503", None).await;
    assert_eq!(unavailable.status, StatusCode::SERVICE_UNAVAILABLE);

    for bad in ["abc", "99", "600"] {
        let response = send(&app, "GET", &format!("/errorCode/{}", bad), None).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY, "code {}", bad);
    }
}

#[tokio::test]
async fn test_options_on_any_path() {
    let app = memory_app(PutPolicy::Upsert, Vec::new());

    for path in ["/", "/api/items", "/does/not/exist"] {
        let response = send(&app, "OPTIONS", path, None).await;
        assert_eq!(response.status, StatusCode::NO_CONTENT, "OPTIONS {}", path);
        let allow = response.headers.get("allow").unwrap().to_str().unwrap();
        for method in ["OPTIONS", "GET", "POST", "PUT", "DELETE", "PATCH"] {
            assert!(allow.contains(method), "Allow is missing {}", method);
        }
        assert_eq!(response.headers.get("cache-control").unwrap(), "max-age=604800");
        assert!(response.raw.is_empty());
    }

    let root = send(&app, "OPTIONS", "/", None).await;
    assert!(!root.headers.contains_key("x-fake-api-path-error"));
    let nested = send(&app, "OPTIONS", "/does/not/exist", None).await;
    assert_eq!(nested.headers.get("x-fake-api-path-error").unwrap(), "does/not/exist");
}

#[tokio::test]
async fn test_trace_echoes_client_headers() {
    let app = memory_app(PutPolicy::Upsert, Vec::new());
    let request = Request::builder()
        .method("TRACE")
        .uri("/some/path")
        .header("trace", "trace-method-test")
        .body(Body::empty())
        .unwrap();

    let response = send_request(&app, request).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers.get("x-fake-api-trace").unwrap(), "client header returned");
    assert_eq!(response.body["header"]["trace"], "trace-method-test");
    assert_eq!(response.body["X-Fake-API-path-error"], "some/path");
    assert!(response.body["hostname"].is_string());
}

#[tokio::test]
async fn test_unmatched_path_and_method_are_405() {
    let app = memory_app(PutPolicy::Upsert, Vec::new());

    let unknown = send(&app, "GET", "/nothing/here", None).await;
    assert_eq!(unknown.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(unknown.body["error"], "MethodNotAllowed");
    assert!(unknown.headers.contains_key("x-fake-rest-api"));

    let wrong_method = send(&app, "DELETE", "/api/items", None).await;
    assert_eq!(wrong_method.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(wrong_method.body["error"], "MethodNotAllowed");
}
