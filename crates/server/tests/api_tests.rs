//! Integration tests for the prediction API endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use predictor_lib::{
    artifact::ArtifactConfig, ColumnSchema, ModelArtifact, ModelState, PredictionService,
    predictor::{LinearModel, TrainedModel},
};
use price_server::{create_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const COLUMNS: [&str; 10] = [
    "Bedrooms",
    "Bathrooms",
    "SquareFeet",
    "Floors",
    "Age",
    "Waterfront",
    "Garage",
    "Garden",
    "Location_Rural",
    "Location_Suburb",
];

fn loaded_state() -> ModelState {
    let model = TrainedModel::Linear(LinearModel {
        intercept: 50000.0,
        coefficients: vec![
            20000.0, 15000.0, 200.0, 5000.0, -500.0, 150000.0, 10000.0, 5000.0, -40000.0,
            -20000.0,
        ],
        means: vec![0.0; 10],
        scales: vec![1.0; 10],
    });
    let schema = ColumnSchema::new(COLUMNS.iter().map(|s| s.to_string()).collect()).unwrap();
    ModelArtifact::new("api-test", model, schema).unwrap().into()
}

fn setup_app(state: ModelState) -> Router {
    let service = PredictionService::new(state);
    create_router(Arc::new(AppState::new(service)))
}

fn reference_body() -> Value {
    json!({
        "bedrooms": 3, "bathrooms": 2, "sqft": 1500, "floors": 1, "age": 10,
        "waterfront": false, "garage": true, "garden": true,
        "location": "City Center", "currency": "USD"
    })
}

fn post_predict(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_predict_reference_request() {
    let app = setup_app(loaded_state());

    let response = app.oneshot(post_predict(&reference_body())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["prediction"], "$455,000.00");
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["model_version"], "api-test");
}

#[tokio::test]
async fn test_predict_is_deterministic() {
    let app = setup_app(loaded_state());

    let first = body_json(app.clone().oneshot(post_predict(&reference_body())).await.unwrap()).await;
    let second = body_json(app.oneshot(post_predict(&reference_body())).await.unwrap()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_predict_in_rupees() {
    let app = setup_app(loaded_state());
    let mut body = reference_body();
    body["currency"] = json!("INR");

    let response = app.oneshot(post_predict(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["prediction"], "₹38,220,000.00");
}

#[tokio::test]
async fn test_currency_defaults_to_usd() {
    let app = setup_app(loaded_state());
    let mut body = reference_body();
    body.as_object_mut().unwrap().remove("currency");

    let response = app.oneshot(post_predict(&body)).await.unwrap();
    assert_eq!(body_json(response).await["prediction"], "$455,000.00");
}

#[tokio::test]
async fn test_non_numeric_sqft_is_bad_request() {
    let app = setup_app(loaded_state());
    let mut body = reference_body();
    body["sqft"] = json!("fifteen hundred");

    let response = app.oneshot(post_predict(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("sqft"), "error was {}", error);
}

#[tokio::test]
async fn test_missing_field_is_bad_request() {
    let app = setup_app(loaded_state());
    let mut body = reference_body();
    body.as_object_mut().unwrap().remove("location");

    let response = app.oneshot(post_predict(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup_app(loaded_state());
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_predict_without_model_is_server_error() {
    let app = setup_app(ModelState::not_loaded("model.json not found"));

    let response = app.oneshot(post_predict(&reference_body())).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("model not loaded"), "error was {}", error);
}

#[tokio::test]
async fn test_model_failure_is_server_error() {
    let model = TrainedModel::Linear(LinearModel {
        intercept: 0.0,
        coefficients: vec![f64::MAX],
        means: vec![0.0],
        scales: vec![1.0],
    });
    let schema = ColumnSchema::new(vec!["SquareFeet".to_string()]).unwrap();
    let state: ModelState = ModelArtifact::new("overflow", model, schema).unwrap().into();
    let app = setup_app(state);

    let response = app.oneshot(post_predict(&reference_body())).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("non-finite"), "error was {}", error);
}

#[tokio::test]
async fn test_non_string_currency_defaults_to_usd() {
    let app = setup_app(loaded_state());
    let mut body = reference_body();
    body["currency"] = json!(5);

    let response = app.oneshot(post_predict(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["prediction"], "$455,000.00");
}

#[tokio::test]
async fn test_lowercase_currency_is_unrecognized() {
    let app = setup_app(loaded_state());
    let mut body = reference_body();
    body["currency"] = json!("inr");

    let response = app.oneshot(post_predict(&body)).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["prediction"], "$455,000.00");
    assert_eq!(body["currency"], "USD");
}

#[tokio::test]
async fn test_empty_location_prices_at_baseline() {
    let app = setup_app(loaded_state());
    let mut body = reference_body();
    body["location"] = json!("");

    let response = app.oneshot(post_predict(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["prediction"], "$455,000.00");
}

#[tokio::test]
async fn test_form_strings_are_accepted() {
    let app = setup_app(loaded_state());
    let body = json!({
        "bedrooms": "3", "bathrooms": "2", "sqft": "1500", "floors": "1", "age": "10",
        "waterfront": false, "garage": true, "garden": true,
        "location": "City Center", "currency": "USD"
    });

    let response = app.oneshot(post_predict(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["prediction"], "$455,000.00");
}

#[tokio::test]
async fn test_index_serves_form() {
    let app = setup_app(ModelState::not_loaded("missing"));

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("id=\"predictionForm\""));
    assert!(html.contains("/predict"));
}

#[tokio::test]
async fn test_schema_endpoint() {
    let app = setup_app(loaded_state());

    let response = app.oneshot(get("/schema")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["kind"], "linear");
    assert_eq!(body["columns"].as_array().unwrap().len(), COLUMNS.len());
    assert_eq!(body["columns"][8], "Location_Rural");
}

#[tokio::test]
async fn test_schema_lists_known_locations() {
    let app = setup_app(loaded_state());
    let body = body_json(app.oneshot(get("/schema")).await.unwrap()).await;
    assert_eq!(body["locations"], json!(["Rural", "Suburb"]));
}

#[tokio::test]
async fn test_schema_without_model() {
    let app = setup_app(ModelState::not_loaded("missing"));
    let response = app.oneshot(get("/schema")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_healthz_and_readyz_when_loaded() {
    let app = setup_app(loaded_state());

    let response = app.clone().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["model"]["version"], "api-test");

    let response = app.oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ready"], true);
}

#[tokio::test]
async fn test_readyz_returns_503_without_model() {
    let app = setup_app(ModelState::not_loaded("missing"));

    let response = app.clone().oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Still alive, just degraded
    let response = app.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "degraded");
}

#[tokio::test]
async fn test_metrics_endpoint_reports_predictions() {
    let app = setup_app(loaded_state());
    app.clone().oneshot(post_predict(&reference_body())).await.unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("house_price_predictions_total"));
    assert!(text.contains("house_price_prediction_latency_seconds"));
}

#[tokio::test]
async fn test_state_loaded_from_artifact_files() {
    let dir = TempDir::new().unwrap();
    let model_path = dir.path().join("model.json");
    let columns_path = dir.path().join("model_columns.json");
    std::fs::write(
        &model_path,
        json!({
            "version": "forest-1",
            "kind": "ensemble",
            "n_features": 3,
            "trees": [
                {"feature": 0, "threshold": 2000.0,
                 "left": {"value": 300000.0}, "right": {"value": 700000.0}},
                {"feature": 2, "threshold": 0.5,
                 "left": {"value": 320000.0}, "right": {"value": 400000.0}}
            ]
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(&columns_path, r#"["SquareFeet", "Age", "Location_Suburb"]"#).unwrap();

    let state = ModelState::load(&ArtifactConfig {
        model_path,
        columns_path,
        ..Default::default()
    });
    assert!(state.is_loaded());

    let app = setup_app(state);
    let mut body = reference_body();
    body["location"] = json!("Suburb");
    let response = app.oneshot(post_predict(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    // (300000 + 400000) / 2
    assert_eq!(body_json(response).await["prediction"], "$350,000.00");
}
