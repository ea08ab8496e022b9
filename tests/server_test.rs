mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{write_retail_fixture, FlakyGenerator, RecordingGenerator};
use std::sync::Arc;
use table_assistant::assistant::Assistant;
use table_assistant::catalog::Catalog;
use table_assistant::llm::AnswerGenerator;
use table_assistant::loader::load_all;
use table_assistant::server::{create_router, AppState, AskResponse, ErrorResponse, HealthResponse};
use tempfile::TempDir;
use tower::ServiceExt;

fn app(generator: Arc<dyn AnswerGenerator>) -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    write_retail_fixture(dir.path()).unwrap();

    let catalog = Catalog::from_json_file(&dir.path().join("catalog.json"))
        .unwrap()
        .resolve_locations(dir.path());
    let tables = load_all(&catalog).unwrap();
    let assistant = Assistant::new(Arc::new(catalog), Arc::new(tables), generator);

    let router = create_router(AppState {
        assistant: Arc::new(assistant),
    });
    (router, dir)
}

fn ask_request(message: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ask")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::json!({ "message": message }).to_string()))
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ask_returns_message() {
    let (router, _dir) = app(Arc::new(RecordingGenerator::default()));

    let response = router
        .oneshot(ask_request("Show total sales by shipping modes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: AskResponse = body_json(response).await;
    assert!(body.message.contains("Standard Class"));
}

#[tokio::test]
async fn test_generation_failure_is_contained() {
    let (router, _dir) = app(Arc::new(FlakyGenerator));

    let response = router
        .clone()
        .oneshot(ask_request("please fail"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = body_json(response).await;
    assert!(body.error.contains("backend unreachable"));

    // The next request is still served
    let response = router.oneshot(ask_request("total sales")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: AskResponse = body_json(response).await;
    assert_eq!(body.message, "ok");
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let (router, _dir) = app(Arc::new(RecordingGenerator::default()));

    let request = Request::builder()
        .method("POST")
        .uri("/ask")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"question": "wrong field"}"#))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_health() {
    let (router, _dir) = app(Arc::new(RecordingGenerator::default()));

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: HealthResponse = body_json(response).await;
    assert_eq!(body.status, "ok");
    assert_eq!(body.tables, 2);
    assert_eq!(body.generator, "recording");
}

#[tokio::test]
async fn test_index_page() {
    let (router, _dir) = app(Arc::new(RecordingGenerator::default()));

    let response = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/ask"));
}
