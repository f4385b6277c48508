#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use fake_rest_api::config::{JwtConfig, PutPolicy};
use fake_rest_api::model::item::Item;
use fake_rest_api::model::user::User;
use fake_rest_api::repository::{ItemRepository, MemoryStore, UserRepository};
use fake_rest_api::router::create_router;
use fake_rest_api::service::item_service::{ItemService, ItemServiceImpl};
use fake_rest_api::service::user_service::{UserService, UserServiceImpl};
use fake_rest_api::util::jwt::JwtTokenUtilsImpl;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for .oneshot()

pub fn router_with(item_repo: Arc<dyn ItemRepository>, user_repo: Arc<dyn UserRepository>, policy: PutPolicy) -> Router {
    let item_service: Arc<dyn ItemService> = Arc::new(ItemServiceImpl::new(item_repo, policy));
    let user_service: Arc<dyn UserService> = Arc::new(UserServiceImpl::new(
        user_repo,
        Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default())),
    ));
    create_router(item_service, user_service)
}

pub fn memory_app(policy: PutPolicy, items: Vec<Item>) -> Router {
    router_with(
        Arc::new(MemoryStore::with_records(items)),
        Arc::new(MemoryStore::<User>::new()),
        policy,
    )
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub raw: Vec<u8>,
    pub body: Value,
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    send_request(app, builder.body(body).unwrap()).await
}

pub async fn send_raw(app: &Router, method: &str, uri: &str, body: &'static str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let raw = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
    let body = if raw.is_empty() { Value::Null } else { serde_json::from_slice(&raw).unwrap() };
    TestResponse { status, headers, raw, body }
}
