use analysis_orchestrator::AnalysisOrchestrator;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use market_data::YahooFinanceClient;
use ml_client::ChatClient;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use technical_analysis::ChartWindow;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod analyze_routes;
pub mod config;
pub mod function_routes;


pub use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: AnalysisOrchestrator) -> Self {
        Self { orchestrator: Arc::new(orchestrator) }
    }
}

/// Error rendered as `{"error": "..."}` with an HTTP status
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, anyhow::anyhow!(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {:#}", self.error);
        }
        (self.status, Json(json!({ "error": self.error.to_string() }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, err.into())
    }
}

/// Body shared by every function endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerRequest {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub chart_days: Option<usize>,
}

impl TickerRequest {
    /// Trimmed, uppercased ticker; blank is a 400
    pub fn normalized_ticker(&self) -> Result<String, AppError> {
        let ticker = self.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(AppError::bad_request("Ticker is required"));
        }
        Ok(ticker)
    }

    /// Unsupported sizes fall back to the default window
    pub fn chart_window(&self) -> ChartWindow {
        self.chart_days
            .and_then(ChartWindow::from_days)
            .unwrap_or_default()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(function_routes::function_routes())
        .merge(analyze_routes::analyze_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    if config.llm.api_key.is_none() {
        tracing::warn!("LLM_API_KEY not set; model-backed fields will use fallbacks");
    }

    let market_data = YahooFinanceClient::new(config.market_data.clone());
    let model = ChatClient::new(config.llm.clone());
    tracing::info!("Using model {} at {}", model.model(), config.llm.endpoint);

    let orchestrator = AnalysisOrchestrator::new(Arc::new(market_data), Arc::new(model));
    let app = build_router(AppState::new(orchestrator));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
