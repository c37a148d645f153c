//! End-to-end tests of the HTTP API, driven in-process through the router.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use semcat_app_server::router;
use semcat_categories::{CategoryService, MemoryStore};
use semcat_embeddings::HashedProvider;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with_store(store: MemoryStore) -> Router {
    let service = CategoryService::new(Arc::new(store), Arc::new(HashedProvider::new(256)));
    router(service)
}

fn app() -> Router {
    app_with_store(MemoryStore::new())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(&body.to_string())).await
}

fn names(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_healthz() {
    let response = app()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_list_and_duplicate() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "items": [] }));

    let (status, created) = post_json(&app, "/categories", json!({ "name": "Electronics" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Electronics");
    assert!(created["id"].is_string());
    assert!(created.get("embedding").is_none());

    let (status, body) = post_json(&app, "/categories", json!({ "name": " electronics " })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = post_json(&app, "/categories", json!({ "name": "Books" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, Method::GET, "/categories", None).await;
    assert_eq!(names(&body["items"]), vec!["Electronics", "Books"]);
    assert_eq!(body["items"][0]["id"], created["id"]);
}

#[tokio::test]
async fn test_register_rejects_blank_and_malformed() {
    let app = app();

    let (status, body) = post_json(&app, "/categories", json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name required");

    let (status, body) = post_json(&app, "/categories", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::POST, "/categories", Some("{ nope")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = app();
    let (_, created) = post_json(&app, "/categories", json!({ "name": "Books" })).await;
    let uri = format!("/categories/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/categories", None).await;
    assert_eq!(body, json!({ "items": [] }));
}

#[tokio::test]
async fn test_search() {
    let app = app();
    for name in ["Electronics", "Gardening", "Books"] {
        post_json(&app, "/categories", json!({ "name": name })).await;
    }

    let (status, body) = post_json(&app, "/search", json!({ "query": "ELECTRONICS" })).await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["name"], "Electronics");
    assert_eq!(results[0]["rank"], 1);
    assert!(results[0]["score"].as_f64().unwrap() > 0.99);

    let (status, body) = post_json(
        &app,
        "/search",
        json!({ "query": "electronics", "topK": 2, "threshold": -1.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["rank"], 2);
    assert!(results[0]["score"].as_f64() >= results[1]["score"].as_f64());
}

#[tokio::test]
async fn test_search_validation() {
    let app = app();

    let (status, body) = post_json(&app, "/search", json!({ "query": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "query required");

    let (status, _) = post_json(&app, "/search", json!({ "query": "x", "topK": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(&app, "/search", json!({ "query": "x", "topK": -3 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_empty_store() {
    let (status, body) = post_json(&app(), "/search", json!({ "query": "anything" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "results": [] }));
}

#[tokio::test]
async fn test_api_prefix() {
    let app = app();
    let (status, _) = post_json(&app, "/api/categories", json!({ "name": "Books" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, Method::GET, "/api/categories", None).await;
    assert_eq!(names(&body["items"]), vec!["Books"]);
}

#[tokio::test]
async fn test_storage_failure_is_500() {
    let app = app_with_store(MemoryStore::with_document("corrupted"));

    let (status, body) = send(&app, Method::GET, "/categories", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("storage error"));

    let (status, _) = send(&app, Method::DELETE, "/categories/abc", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = post_json(&app, "/search", json!({ "query": "books" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
