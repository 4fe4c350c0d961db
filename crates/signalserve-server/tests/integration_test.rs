//! Integration tests for the SignalServe HTTP API

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde_json::{json, Value};
use signalserve_core::{ModelDescriptor, Result};
use signalserve_model::{FeatureBatch, LoadedModel, NearestCentroid, Predictor, ProbabilityError};
use signalserve_server::{create_router, AppState, ServerConfig};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;

/// Predicts a fixed class with a fixed distribution
struct FixedPredictor {
    class: usize,
    probabilities: Vec<f64>,
}

impl Predictor for FixedPredictor {
    fn predict_class(&self, batch: &FeatureBatch<'_>) -> Result<Vec<usize>> {
        Ok(vec![self.class; batch.len()])
    }

    fn predict_probabilities(
        &self,
        batch: &FeatureBatch<'_>,
    ) -> std::result::Result<Vec<Vec<f64>>, ProbabilityError> {
        Ok(vec![self.probabilities.clone(); batch.len()])
    }

    fn model_type(&self) -> &str {
        "fixed"
    }
}

fn trading_descriptor() -> ModelDescriptor {
    let class_colors: BTreeMap<String, String> = [("0", "red"), ("1", "gray"), ("2", "green")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut descriptor = ModelDescriptor::new(
        "XGBoost",
        vec!["rsi".to_string(), "macd".to_string(), "volume".to_string()],
        vec!["SELL".to_string(), "HOLD".to_string(), "BUY".to_string()],
        class_colors,
    );
    descriptor
        .extra
        .insert("fecha_entrenamiento".to_string(), json!("2024-05-01"));
    descriptor
}

fn app_with(descriptor: ModelDescriptor, predictor: Arc<dyn Predictor>, config: ServerConfig) -> Router {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    app_with_handle(descriptor, predictor, config, handle)
}

fn app_with_handle(
    descriptor: ModelDescriptor,
    predictor: Arc<dyn Predictor>,
    config: ServerConfig,
    handle: PrometheusHandle,
) -> Router {
    let model = LoadedModel::new(descriptor, predictor).unwrap();
    create_router(AppState::from_model(config, &model, handle))
}

fn buy_app() -> Router {
    app_with(
        trading_descriptor(),
        Arc::new(FixedPredictor {
            class: 2,
            probabilities: vec![0.05, 0.15, 0.80],
        }),
        ServerConfig::default(),
    )
}

async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_predict_buy_signal() {
    let (status, body) = post_json(buy_app(), "/predecir", r#"{"features": [30, -0.5, 1000]}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "prediccion": "BUY",
            "prediccion_numerica": 2,
            "clase_color": "green",
            "probabilidades": {"SELL": 5.0, "HOLD": 15.0, "BUY": 80.0},
            "features_recibidas": {"rsi": 30.0, "macd": -0.5, "volume": 1000.0}
        })
    );
}

#[tokio::test]
async fn test_predict_alias_route() {
    let (status, body) = post_json(buy_app(), "/predict", r#"{"features": [30, -0.5, 1000]}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediccion"], "BUY");
}

#[tokio::test]
async fn test_predict_wrong_length() {
    let (status, body) = post_json(buy_app(), "/predecir", r#"{"features": [30, -0.5]}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Se esperan 3 features, se recibieron 2"}));
}

#[tokio::test]
async fn test_predict_missing_features() {
    let (status, body) = post_json(buy_app(), "/predecir", r#"{"rsi": 30}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Falta el campo \"features\""}));
}

#[tokio::test]
async fn test_predict_non_numeric_feature() {
    let (status, body) = post_json(buy_app(), "/predecir", r#"{"features": [30, "alto", 1000]}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("posición 1"));
}

#[tokio::test]
async fn test_predict_malformed_json() {
    let (status, body) = post_json(buy_app(), "/predecir", "{features: [1, 2, 3]").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Petición inválida"));
}

#[tokio::test]
async fn test_predict_without_probabilities() {
    let model = NearestCentroid::new(vec![
        vec![75.0, -1.0, 500.0],
        vec![50.0, 0.0, 500.0],
        vec![25.0, 1.0, 500.0],
    ])
    .unwrap();
    let app = app_with(trading_descriptor(), Arc::new(model), ServerConfig::default());

    let (status, body) = post_json(app, "/predecir", r#"{"features": [30, 0.8, 480]}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediccion"], "BUY");
    assert!(body["probabilidades"].is_null());
}

#[tokio::test]
async fn test_contract_violation_is_server_error() {
    let mut descriptor = trading_descriptor();
    descriptor.class_colors.remove("2");
    let app = app_with(
        descriptor,
        Arc::new(FixedPredictor {
            class: 2,
            probabilities: vec![0.1, 0.1, 0.8],
        }),
        ServerConfig::default(),
    );

    let (status, body) = post_json(app, "/predecir", r#"{"features": [1, 2, 3]}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("class color"));
}

#[tokio::test]
async fn test_body_limit() {
    let config = ServerConfig {
        max_body_bytes: 16,
        ..Default::default()
    };
    let app = app_with(
        trading_descriptor(),
        Arc::new(FixedPredictor {
            class: 0,
            probabilities: vec![1.0, 0.0, 0.0],
        }),
        config,
    );

    let (status, body) = post_json(app, "/predecir", r#"{"features": [30.0, -0.5, 1000.0]}"#).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_info_passthrough() {
    let (status, body) = get(buy_app(), "/info").await;
    let info: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["model_type"], "XGBoost");
    assert_eq!(info["features"], json!(["rsi", "macd", "volume"]));
    assert_eq!(info["classes"], json!(["SELL", "HOLD", "BUY"]));
    assert_eq!(info["class_colors"]["1"], "gray");
    assert_eq!(info["fecha_entrenamiento"], "2024-05-01");
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get(buy_app(), "/health").await;
    let health: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["model_type"], "XGBoost");
}

#[tokio::test]
async fn test_home_lists_endpoints() {
    let (status, body) = get(buy_app(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/predecir"));
    assert!(body.contains("/info"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    // current_thread runtime: the handlers run on this thread and see the local recorder
    let recorder = PrometheusBuilder::new().build_recorder();
    let _guard = metrics::set_default_local_recorder(&recorder);
    let app = app_with_handle(
        trading_descriptor(),
        Arc::new(FixedPredictor {
            class: 2,
            probabilities: vec![0.05, 0.15, 0.80],
        }),
        ServerConfig::default(),
        recorder.handle(),
    );

    let (status, _) = post_json(app.clone(), "/predecir", r#"{"features": [30, -0.5, 1000]}"#).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(app.clone(), "/predecir", r#"{"features": [30]}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"signalserve_requests_total{outcome="success"} 1"#), "{}", body);
    assert!(body.contains(r#"signalserve_errors_total{kind="arity_mismatch"} 1"#), "{}", body);
    assert!(body.contains("signalserve_predict_latency_us"), "{}", body);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = get(buy_app(), "/nope").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let response = buy_app()
        .oneshot(
            Request::builder()
                .uri("/info")
                .header(header::ORIGIN, "http://dashboard.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
