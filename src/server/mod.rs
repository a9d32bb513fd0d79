// Server module
// HTTP surface: the chat page and the JSON chat endpoint


use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::LinkragError;
use crate::completion::ChatMessage;
use crate::pipeline::ChatPipeline;

const INDEX_HTML: &str = include_str!("assets/index.html");

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
}

impl AppState {
    #[inline]
    pub fn new(pipeline: ChatPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A failed chat request, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    #[inline]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<LinkragError> for ApiError {
    #[inline]
    fn from(error: LinkragError) -> Self {
        let message = match error {
            LinkragError::Embedding(message) | LinkragError::Chat(message) => message,
            other => other.to_string(),
        };
        Self::internal(message)
    }
}

impl IntoResponse for ApiError {
    #[inline]
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[inline]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/chat", post(chat_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is interrupted
#[inline]
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn healthz() -> &'static str {
    "ok"
}

/// `POST /api/chat` with the conversation so far as a JSON array of messages
#[instrument(name = "chat", skip_all, fields(request_id = %Uuid::new_v4()))]
async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let messages: Vec<ChatMessage> = serde_json::from_slice(&body).map_err(|e| {
        error!("Rejected malformed chat request: {}", e);
        ApiError::bad_request(format!("Invalid request body: {}", e))
    })?;
    debug!("Chat request with {} messages", messages.len());

    match state.pipeline.answer(&messages).await {
        Ok(content) => {
            info!("Chat request completed");
            Ok(Json(ChatResponse { content }))
        }
        Err(e) => {
            error!("Chat request failed: {}", e);
            Err(ApiError::from(e))
        }
    }
}
