//! HTTP API for predictions, health checks and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use predictor_lib::{
    health, predictor::LOCATION_PREFIX, HealthResponse, PredictError, PredictionService,
    RawAttributes,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Browser form that posts to `/predict`
const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: PredictionService,
}

impl AppState {
    pub fn new(service: PredictionService) -> Self {
        Self { service }
    }
}

/// Successful prediction body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
    pub currency: String,
    pub amount: f64,
    pub model_version: String,
}

/// Error body shared by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Columns and identity of the loaded model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub version: String,
    pub kind: String,
    pub columns: Vec<String>,
    /// Locations with their own indicator column; others price at the baseline
    pub locations: Vec<String>,
}

/// A [`PredictError`] rendered as an HTTP response
pub struct ApiError(PredictError);

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}

/// Price prediction for one house
async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawAttributes>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(raw) = payload.map_err(|rejection| {
        PredictError::validation("body", rejection.body_text())
    })?;

    let result = state.service.predict_price(&raw, None)?;
    Ok(Json(PredictionResponse {
        prediction: result.formatted,
        currency: result.currency,
        amount: result.amount,
        model_version: result.model_version,
    }))
}

/// Column schema of the loaded model
async fn schema(State(state): State<Arc<AppState>>) -> Result<Json<SchemaResponse>, ApiError> {
    let artifact = state
        .service
        .state()
        .artifact()
        .ok_or_else(|| PredictError::ModelNotLoaded("no trained artifact available".to_string()))?;

    let schema = artifact.schema();
    let locations = schema
        .indicator_columns(LOCATION_PREFIX)
        .filter_map(|c| c.strip_prefix(LOCATION_PREFIX)?.strip_prefix('_'))
        .map(str::to_string)
        .collect();

    Ok(Json(SchemaResponse {
        version: artifact.version().to_string(),
        kind: artifact.kind().to_string(),
        columns: schema.columns().to_vec(),
        locations,
    }))
}

/// Prediction form
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check response - 200 whenever the process is serving, degraded or not
async fn healthz(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(health::health(state.service.state()))
}

/// Readiness check response - returns 200 once a model is loaded, 503 otherwise
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = health::readiness(state.service.state());

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/schema", get(schema))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
