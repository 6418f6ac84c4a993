use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use nextword_core::{pad_predictions, InputGuard, Prediction};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::predictor::Predictor;
use crate::protocol::{ErrorResponse, HealthResponse, OutputQuery};

/// Process-wide handles shared by every request.
pub struct AppState {
    pub predictor: Predictor,
    pub guard: InputGuard,
    pub request_timeout: Duration,
}

pub struct PredictionServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl PredictionServer {
    pub fn new(config: ServerConfig, guard: InputGuard, predictor: Predictor) -> Self {
        let state = Arc::new(AppState {
            predictor,
            guard,
            request_timeout: config.request_timeout(),
        });
        Self { config, state }
    }

    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind)
            .await
            .with_context(|| format!("failed to bind {}", self.config.bind))?;
        info!(
            source = ?self.state.predictor.source(),
            "nextword daemon listening on {}",
            self.config.bind
        );

        axum::serve(listener, router(self.state.clone()))
            .await
            .context("HTTP server terminated")
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/output", get(output))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(internal_error))
        .with_state(state)
}

/// Query pairs are taken as a raw list so repeated keys never reject the
/// request; the first `string` wins.
async fn output(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<Vec<Prediction>> {
    let query = OutputQuery::from_pairs(pairs);
    Json(respond(&state, &query.string).await)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        source: state.predictor.source(),
        cached_entries: state.predictor.cache().len(),
    })
}

async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}

fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("request handler panicked: {detail}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error")),
    )
        .into_response()
}

/// Guard, sanitize, predict, pad. Rejected or blank input answers `[]`;
/// accepted input always answers exactly three pairs, including when the
/// prediction overruns the request timeout.
pub async fn respond(state: &AppState, raw: &str) -> Vec<Prediction> {
    let text = raw.trim();
    if !state.guard.validate(text) {
        return Vec::new();
    }
    let text = state.guard.sanitize(text);
    if text.is_empty() {
        return Vec::new();
    }

    match timeout(state.request_timeout, state.predictor.get_predictions(&text)).await {
        Ok(predictions) => pad_predictions(predictions),
        Err(_) => {
            warn!(
                timeout_ms = state.request_timeout.as_millis() as u64,
                "prediction exceeded request timeout"
            );
            pad_predictions(Vec::new())
        }
    }
}
