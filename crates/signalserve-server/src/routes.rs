//! HTTP routes and handlers

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use signalserve_core::{Error, ErrorResponse, PredictionResult};
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info_span, warn};

use crate::config::CorsConfig;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/", get(home))
        .route("/info", get(model_info))
        .route("/predecir", post(predict))
        .route("/predict", post(predict))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allow_any_origin {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn home() -> Html<&'static str> {
    Html(
        r#"<h1>API de Predicción - SignalServe</h1>
<p>Servidor activo y funcionando</p>
<h3>Endpoints disponibles:</h3>
<ul>
    <li><b>GET /info</b> - Información del modelo</li>
    <li><b>POST /predecir</b> - Hacer predicción</li>
    <li><b>GET /health</b> - Estado del servidor</li>
    <li><b>GET /metrics</b> - Métricas Prometheus</li>
</ul>
"#,
    )
}

/// Descriptor passthrough for client introspection
async fn model_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.descriptor().clone())
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model_loaded": true,
        "model_type": state.service.descriptor().model_type,
    }))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

/// Main prediction handler
async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let start = Instant::now();

    let outcome = info_span!("predict", %request_id).in_scope(|| {
        let body = body?;
        let payload: Value = serde_json::from_slice(&body)
            .map_err(|e| Error::invalid_payload(format!("JSON inválido: {}", e)))?;
        Ok::<_, ApiError>(state.service.predict_json(&payload)?)
    });

    metrics::histogram!("signalserve_predict_latency_us")
        .record(start.elapsed().as_micros() as f64);

    let result = outcome?;
    if result.probabilities.is_none() {
        metrics::counter!("signalserve_probabilities_unavailable_total").increment(1);
    }
    metrics::counter!("signalserve_requests_total", "outcome" => "success").increment(1);
    debug!(%request_id, "Prediction served: {}", result.predicted_label);

    Ok(Json(result))
}

async fn fallback() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Ruta no encontrada".to_string(),
        }),
    )
        .into_response()
}

/// Error handling
#[derive(Debug)]
pub enum ApiError {
    /// Rejected by the prediction pipeline
    Prediction(Error),

    /// Body could not be read (too large, aborted, ...)
    Body { status: StatusCode, message: String },
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Prediction(err)
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::Body {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Prediction(err) if err.is_caller_fault() => {
                warn!("Rejected prediction request: {}", err);
                (StatusCode::BAD_REQUEST, err.kind(), err.to_string())
            }
            ApiError::Prediction(err) => {
                error!("Prediction failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.kind(), err.to_string())
            }
            ApiError::Body { status, message } => {
                warn!("Unreadable request body: {}", message);
                (status, "body", message)
            }
        };

        let outcome = if status.is_server_error() {
            "server_error"
        } else {
            "client_error"
        };
        metrics::counter!("signalserve_requests_total", "outcome" => outcome).increment(1);
        metrics::counter!("signalserve_errors_total", "kind" => kind).increment(1);

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
