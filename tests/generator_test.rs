//! Generators against in-process stand-ins for the Mistral and Ollama APIs

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use table_assistant::error::AssistantError;
use table_assistant::llm::{AnswerGenerator, MistralGenerator, OllamaGenerator};
use tokio::net::TcpListener;

async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn mistral_chat(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthorized"})));
    }
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    let reply = format!("{} answered: {}", body["model"].as_str().unwrap_or_default(), prompt);
    (
        StatusCode::OK,
        Json(json!({
            "id": "cmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": reply}, "finish_reason": "stop"}]
        })),
    )
}

async fn ollama_generate(Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body["stream"], json!(false));
    Json(json!({
        "model": body["model"],
        "response": format!("local: {}", body["prompt"].as_str().unwrap_or_default()),
        "done": true
    }))
}

#[tokio::test]
async fn test_mistral_chat_completion() {
    let base = spawn(Router::new().route("/v1/chat/completions", post(mistral_chat))).await;

    let generator = MistralGenerator::new(
        "sk-test".to_string(),
        "mistral-large-latest".to_string(),
        format!("{}/v1/", base),
    );
    let answer = generator.generate("total sales?").await.unwrap();
    assert_eq!(answer, "mistral-large-latest answered: total sales?");
}

#[tokio::test]
async fn test_mistral_error_status_is_generation_error() {
    let base = spawn(Router::new().route("/v1/chat/completions", post(mistral_chat))).await;

    let generator = MistralGenerator::new(
        "wrong-key".to_string(),
        "mistral-large-latest".to_string(),
        format!("{}/v1", base),
    );
    let err = generator.generate("total sales?").await.unwrap_err();
    assert!(matches!(err, AssistantError::Generation(msg) if msg.contains("401")));
}

#[tokio::test]
async fn test_ollama_generate() {
    let base = spawn(Router::new().route("/api/generate", post(ollama_generate))).await;

    let generator = OllamaGenerator::new("mistral".to_string(), base);
    let answer = generator.generate("total sales?").await.unwrap();
    assert_eq!(answer, "local: total sales?");
}

#[tokio::test]
async fn test_unreachable_backend_is_generation_error() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let generator = OllamaGenerator::new("mistral".to_string(), format!("http://{}", addr));
    assert!(matches!(
        generator.generate("hello").await,
        Err(AssistantError::Generation(_))
    ));
}
