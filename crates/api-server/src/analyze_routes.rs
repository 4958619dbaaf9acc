use analysis_orchestrator::AggregateAnalysis;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::{AppError, AppState, TickerRequest};

pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/health", get(health))
}

/// Prediction plus every auxiliary section in one round trip
async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<TickerRequest>,
) -> Result<Json<AggregateAnalysis>, AppError> {
    let ticker = request.normalized_ticker()?;
    let aggregate = state
        .orchestrator
        .analyze_all(&ticker, request.chart_window())
        .await?;
    Ok(Json(aggregate))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
