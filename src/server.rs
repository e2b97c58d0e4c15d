//! HTTP surface: the landing page, a health probe, and the predict endpoint.

use crate::features::FeatureAssembler;
use crate::metrics::ServiceMetrics;
use crate::models::MatchClassifier;
use crate::types::{ErrorResponse, MatchResponse, TrialRecord};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

/// Shared read-only state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<FeatureAssembler>,
    pub classifier: Arc<MatchClassifier>,
    pub metrics: Arc<ServiceMetrics>,
}

/// Build the service router. Cross-origin requests are allowed from any
/// origin; the API carries no credentials.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn home() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "feature_count": state.assembler.feature_count(),
    }))
}

/// Classify one trial record.
///
/// Every failure between feature assembly and inference surfaces as a 400
/// with the error message; a failed request has no side effects.
async fn predict(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<MatchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let start = Instant::now();

    // Parse by hand so malformed JSON gets the same error shape as every
    // other rejected request
    let record: TrialRecord = serde_json::from_str(&body)
        .map_err(|e| reject(&state, format!("Invalid JSON body: {}", e)))?;

    let features = state
        .assembler
        .assemble(&record)
        .map_err(|e| reject(&state, e.to_string()))?;

    let prediction = state
        .classifier
        .predict(&features)
        .map_err(|e| reject(&state, e.to_string()))?;

    let latency = start.elapsed();
    state.metrics.record_prediction(latency, prediction.probability);

    debug!(
        matched = prediction.matched,
        probability = prediction.probability,
        latency_us = latency.as_micros(),
        "Prediction served"
    );

    Ok(Json(MatchResponse {
        matched: prediction.matched,
        probability: prediction.probability,
    }))
}

fn reject(state: &AppState, message: String) -> (StatusCode, Json<ErrorResponse>) {
    state.metrics.record_rejection();
    warn!(error = %message, "Request rejected");
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}
