mod common;

use axum::http::StatusCode;
use common::{router_with, send};
use fake_rest_api::config::PutPolicy;
use fake_rest_api::model::item::{Item, ItemId};
use fake_rest_api::model::user::User;
use fake_rest_api::repository::{ItemRepository, JsonFileStore, RecordStore};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

fn file_app(dir: &Path) -> axum::Router {
    router_with(
        Arc::new(JsonFileStore::<Item>::new(dir.join("data.json"))),
        Arc::new(JsonFileStore::<User>::new(dir.join("users.json"))),
        PutPolicy::Upsert,
    )
}

#[tokio::test]
async fn test_missing_file_is_an_empty_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(dir.path());

    let list = send(&app, "GET", "/api/items", None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["count"], 0);
    assert!(!dir.path().join("data.json").exists());
}

#[tokio::test]
async fn test_file_layout_uses_three_space_indent() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(dir.path());

    let item = json!({"id": 1, "description": "Nail", "price": 0.05, "quantity": 1000, "category": "tools"});
    assert_eq!(send(&app, "POST", "/addItem", Some(item)).await.status, StatusCode::CREATED);

    let content = std::fs::read_to_string(dir.path().join("data.json")).unwrap();
    assert!(content.starts_with("[\n   {\n      \"id\": 1,"), "unexpected layout:\n{}", content);
    assert!(content.ends_with("]\n"));
    assert!(!dir.path().join("data.json.tmp").exists());
}

#[tokio::test]
async fn test_changes_survive_a_new_store_instance() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");

    let first = JsonFileStore::<Item>::new(&path);
    ItemRepository::insert(
        &first,
        Item {
            id: ItemId::from("abc"),
            description: "Glue".to_string(),
            price: 2.5,
            quantity: 3,
            category: None,
        },
    )
    .await
    .unwrap();
    drop(first);

    let second = JsonFileStore::<Item>::new(&path);
    let found = ItemRepository::find(&second, &ItemId::from("abc")).await.unwrap().unwrap();
    assert_eq!(found.description, "Glue");
    assert_eq!(RecordStore::count(&second).await.unwrap(), 1);
}

#[tokio::test]
async fn test_preexisting_file_is_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("data.json"),
        r#"[{"id": "100", "description": "Hammer", "price": 9.99, "quantity": 20}]"#,
    )
    .unwrap();
    let app = file_app(dir.path());

    let by_number = send(&app, "GET", "/id/100", None).await;
    assert_eq!(by_number.status, StatusCode::OK);
    assert_eq!(by_number.body["id"], "100");

    let patched = send(&app, "PATCH", "/patchItem/quantity", Some(json!({"id": 100, "quantity": 19}))).await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.body["quantity"], 19);
}

#[tokio::test]
async fn test_corrupt_file_is_an_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("data.json"), "{ not json").unwrap();
    let app = file_app(dir.path());

    let list = send(&app, "GET", "/api/items", None).await;
    assert_eq!(list.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_users_live_in_their_own_file() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(dir.path());

    let signup = json!({"fullname": "Alan", "email": "alan@example.com", "password": "pw", "role": "super"});
    assert_eq!(send(&app, "POST", "/api/user/signup", Some(signup)).await.status, StatusCode::CREATED);

    let users = std::fs::read_to_string(dir.path().join("users.json")).unwrap();
    assert!(users.contains("alan@example.com"));
    assert!(!users.contains("\"pw\""));
    assert!(!dir.path().join("data.json").exists());
}
