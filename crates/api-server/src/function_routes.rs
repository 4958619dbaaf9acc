//! One endpoint per analysis function
//!
//! Auxiliary sections always answer 200 with a ready, sample or unavailable
//! body; only unexpected failures surface as 500.

use analysis_orchestrator::{
    FinancialsReport, FundamentalsReport, NewsReport, OwnershipReport, PredictionResponse, Section,
};
use axum::{extract::State, routing::post, Json, Router};

use crate::{AppError, AppState, TickerRequest};

pub fn function_routes() -> Router<AppState> {
    Router::new()
        .route("/functions/predict-stock", post(predict_stock))
        .route("/functions/company-financials", post(company_financials))
        .route("/functions/stock-fundamentals", post(stock_fundamentals))
        .route("/functions/stock-news", post(stock_news))
        .route("/functions/stock-ownership", post(stock_ownership))
}

async fn predict_stock(
    State(state): State<AppState>,
    Json(request): Json<TickerRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    let ticker = request.normalized_ticker()?;
    let response = state
        .orchestrator
        .predict(&ticker, request.chart_window())
        .await?;
    Ok(Json(response))
}

async fn company_financials(
    State(state): State<AppState>,
    Json(request): Json<TickerRequest>,
) -> Result<Json<Section<FinancialsReport>>, AppError> {
    let ticker = request.normalized_ticker()?;
    Ok(Json(state.orchestrator.financials(&ticker).await?))
}

async fn stock_fundamentals(
    State(state): State<AppState>,
    Json(request): Json<TickerRequest>,
) -> Result<Json<Section<FundamentalsReport>>, AppError> {
    let ticker = request.normalized_ticker()?;
    Ok(Json(state.orchestrator.fundamentals(&ticker).await?))
}

async fn stock_news(
    State(state): State<AppState>,
    Json(request): Json<TickerRequest>,
) -> Result<Json<Section<NewsReport>>, AppError> {
    let ticker = request.normalized_ticker()?;
    Ok(Json(state.orchestrator.news(&ticker).await?))
}

async fn stock_ownership(
    State(state): State<AppState>,
    Json(request): Json<TickerRequest>,
) -> Result<Json<Section<OwnershipReport>>, AppError> {
    let ticker = request.normalized_ticker()?;
    Ok(Json(state.orchestrator.ownership(&ticker).await?))
}
