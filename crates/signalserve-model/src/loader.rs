//! Startup loading of the descriptor and model artifact

use crate::artifact::ModelArtifact;
use crate::predictor::Predictor;
use crate::service::PredictionService;
use signalserve_core::{Error, ModelDescriptor, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Descriptor and predictor, loaded and checked against each other
#[derive(Clone)]
pub struct LoadedModel {
    pub descriptor: Arc<ModelDescriptor>,
    pub predictor: Arc<dyn Predictor>,
}

impl LoadedModel {
    /// Pair an in-memory descriptor and predictor after checking compatibility
    pub fn new(descriptor: ModelDescriptor, predictor: Arc<dyn Predictor>) -> Result<Self> {
        descriptor.validate()?;
        check_compatibility(&descriptor, predictor.as_ref())?;
        Ok(Self {
            descriptor: Arc::new(descriptor),
            predictor,
        })
    }

    /// Build the request-level service over this model
    pub fn service(&self) -> PredictionService {
        PredictionService::new(self.descriptor.clone(), self.predictor.clone())
    }
}

/// Load descriptor and artifact from disk
pub fn load_model(
    descriptor_path: impl AsRef<Path>,
    model_path: impl AsRef<Path>,
) -> Result<LoadedModel> {
    let descriptor_path = descriptor_path.as_ref();
    let model_path = model_path.as_ref();

    info!("Loading model descriptor from: {}", descriptor_path.display());
    let descriptor = ModelDescriptor::from_file(descriptor_path)?;

    info!("Loading model artifact from: {}", model_path.display());
    let artifact = ModelArtifact::from_file(model_path)?;
    let kind = artifact.kind();
    let predictor = artifact.into_predictor()?;

    let model = LoadedModel::new(descriptor, predictor)?;
    info!(
        "Model loaded: type={} artifact={} features={} classes={:?}",
        model.descriptor.model_type,
        kind,
        model.descriptor.feature_count(),
        model.descriptor.classes
    );

    Ok(model)
}

/// Reject predictor/descriptor pairs that could never serve a request correctly
pub fn check_compatibility(descriptor: &ModelDescriptor, predictor: &dyn Predictor) -> Result<()> {
    if let Some(n_features) = predictor.n_features() {
        if n_features != descriptor.feature_count() {
            return Err(Error::config(format!(
                "model expects {} features but descriptor lists {}",
                n_features,
                descriptor.feature_count()
            )));
        }
    }

    if let Some(n_classes) = predictor.n_classes() {
        if n_classes != descriptor.class_count() {
            return Err(Error::config(format!(
                "model emits {} classes but descriptor lists {}",
                n_classes,
                descriptor.class_count()
            )));
        }
    }

    // Missing colors only fail the requests that hit them.
    let uncolored = descriptor.uncolored_classes();
    if !uncolored.is_empty() {
        warn!("Descriptor has no class color for class indices {:?}", uncolored);
    }

    Ok(())
}
