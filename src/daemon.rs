use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::client::Dashboard;
use crate::config::Config;
use crate::domains::chat::{ChatMessage, ChatSession};
use crate::error::{AdspotError, Result};
use crate::inventory::ProvinceCount;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub token: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
pub struct ProvincesResponse {
    pub provinces: Vec<ProvinceCount>,
}

#[derive(Serialize, Deserialize)]
pub struct TablesResponse {
    pub tables: Vec<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/map", get(map_view))
        .route("/analytics/provinces", get(provinces))
        .route("/tables", get(tables))
        .route("/chat", post(chat))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn map_view(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Err(err) = authorize(&headers, &state.token) {
        return err.into_response();
    }
    match state.dashboard.map_view().await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => internal_error(err).into_response(),
    }
}

async fn provinces(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Err(err) = authorize(&headers, &state.token) {
        return err.into_response();
    }
    match state.dashboard.province_counts().await {
        Ok(provinces) => (StatusCode::OK, Json(ProvincesResponse { provinces })).into_response(),
        Err(err) => internal_error(err).into_response(),
    }
}

async fn tables(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Err(err) = authorize(&headers, &state.token) {
        return err.into_response();
    }
    match state.dashboard.tables().await {
        Ok(tables) => (StatusCode::OK, Json(TablesResponse { tables })).into_response(),
        Err(err) => internal_error(err).into_response(),
    }
}

/// One chat turn. The transcript travels with the request and comes back
/// with the new user and assistant messages appended.
async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> impl IntoResponse {
    if let Err(err) = authorize(&headers, &state.token) {
        return err.into_response();
    }
    if payload.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "text must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    let mut session = ChatSession::from_messages(payload.messages);
    let reply = state.dashboard.chat(&mut session, &payload.text).await;
    (
        StatusCode::OK,
        Json(ChatResponse {
            reply,
            messages: session.into_messages(),
        }),
    )
        .into_response()
}

fn internal_error(err: AdspotError) -> (StatusCode, Json<ErrorResponse>) {
    tracing::warn!(error = %err, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn authorize(
    headers: &HeaderMap,
    token: &str,
) -> std::result::Result<(), (StatusCode, Json<ErrorResponse>)> {
    let header = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let api_key = headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let bearer = header.strip_prefix("Bearer ").unwrap_or("");

    if bearer == token || api_key == token {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Unauthorized".to_string(),
            }),
        ))
    }
}

pub async fn run(host: &str, port: u16, config: &Config, token: &str) -> Result<()> {
    run_with_shutdown(host, port, config, token, futures::future::pending::<()>()).await
}

pub async fn run_with_shutdown<F>(
    host: &str,
    port: u16,
    config: &Config,
    token: &str,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let dashboard = Arc::new(Dashboard::from_config(config).await?);
    serve(host, port, dashboard, token, shutdown).await
}

pub async fn serve<F>(
    host: &str,
    port: u16,
    dashboard: Arc<Dashboard>,
    token: &str,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = AppState {
        dashboard,
        token: token.to_string(),
    };
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AdspotError::Runtime(e.to_string()))?;
    tracing::info!(%addr, "adspotd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AdspotError::Runtime(e.to_string()))?;

    Ok(())
}
