//! HTTP boundary: `POST /api/generate`, `POST /api/export/txt` and
//! `GET /api/health`.
//!
//! Every failure is answered with a JSON [`ErrorResponse`]; nothing escapes as
//! a bare status or plain-text body.

use crate::config::AppConfig;
use crate::error::GenerateError;
use crate::model::{recipes_to_plain_text, Recipe, PLAIN_TEXT_FILE_NAME};
use crate::providers::RecipeGenerator;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    generator: Arc<RecipeGenerator>,
    expose_error_details: bool,
}

impl AppState {
    pub fn new(generator: RecipeGenerator, expose_error_details: bool) -> Self {
        AppState {
            generator: Arc::new(generator),
            expose_error_details,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub recipes: Vec<Recipe>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub recipes: Vec<Recipe>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/export/txt", post(export_txt))
        .route("/api/health", get(health))
        .with_state(state)
}

fn error_response(status: StatusCode, error: String, details: Option<String>) -> Response {
    (status, Json(ErrorResponse { error, details })).into_response()
}

/// Generate recipes from `{ "prompt": "..." }`.
async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let prompt = match payload {
        Ok(Json(request)) => request
            .prompt
            .as_str()
            .unwrap_or_default()
            .trim()
            .to_string(),
        Err(rejection) => {
            debug!("Rejected generate request body: {}", rejection);
            String::new()
        }
    };

    if prompt.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            GenerateError::EmptyPrompt.to_string(),
            None,
        );
    }

    match state.generator.generate(&prompt).await {
        Ok(recipes) => (StatusCode::OK, Json(GenerateResponse { recipes })).into_response(),
        Err(e @ GenerateError::EmptyPrompt) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string(), None)
        }
        Err(e) => {
            if e.is_quota() {
                warn!("Provider quota exhausted: {}", e);
            } else if e.is_network() {
                warn!("Providers unreachable: {}", e);
            } else {
                error!("API Error: {}", e);
            }
            let details = state.expose_error_details.then(|| format!("{:?}", e));
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.user_message(), details)
        }
    }
}

/// Render `{ "recipes": [...] }` as a plain-text download.
async fn export_txt(payload: Result<Json<ExportRequest>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(request)) => {
            let disposition = format!("attachment; filename=\"{}\"", PLAIN_TEXT_FILE_NAME);
            let headers = [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ];
            (headers, recipes_to_plain_text(&request.recipes)).into_response()
        }
        Err(rejection) => error_response(
            StatusCode::BAD_REQUEST,
            "Invalid recipes payload".to_string(),
            Some(rejection.body_text()),
        ),
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "providers": state.generator.provider_names(),
    }))
}

/// Run the HTTP server until Ctrl-C.
pub async fn serve(config: &AppConfig) -> std::io::Result<()> {
    let generator = RecipeGenerator::from_config(config);
    if generator.provider_names().is_empty() {
        warn!("No AI provider configured; generate requests will fail until a key is set");
    }

    let state = AppState::new(generator, config.server.expose_error_details);
    let listener = tokio::net::TcpListener::bind(config.server.bind.as_str()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
