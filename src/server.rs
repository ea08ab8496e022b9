//! HTTP front end for the assistant
//!
//! `POST /ask` takes `{"message": ...}` and answers with `{"message": ...}`, or
//! `{"error": ...}` and a 500 status when the pipeline fails. Failures are
//! contained to the request that caused them.

use crate::assistant::Assistant;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared between handlers
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub tables: usize,
    pub generator: String,
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn ask(State(state): State<AppState>, Json(request): Json<AskRequest>) -> Response {
    match state.assistant.answer(&request.message).await {
        Ok(answer) => (StatusCode::OK, Json(AskResponse { message: answer })).into_response(),
        Err(e) => {
            error!("Error processing query: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: e.to_string() }),
            )
                .into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        tables: state.assistant.tables().len(),
        generator: state.assistant.generator_name().to_string(),
    })
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/ask", post(ask))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}
