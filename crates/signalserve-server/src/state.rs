//! Application state shared across all requests

use crate::config::ServerConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use signalserve_model::{load_model, LoadedModel, PredictionService};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Prediction pipeline over the loaded model
    pub service: PredictionService,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Load the model named by the configuration
    pub fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> anyhow::Result<Self> {
        let model = load_model(&config.descriptor_path, &config.model_path)?;
        Ok(Self::from_model(config, &model, metrics_handle))
    }

    /// Build state around an already-loaded model
    pub fn from_model(
        config: ServerConfig,
        model: &LoadedModel,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        info!(
            "Serving {} model with {} features",
            model.descriptor.model_type,
            model.descriptor.feature_count()
        );

        Self {
            config: Arc::new(config),
            service: model.service(),
            metrics_handle,
        }
    }
}
