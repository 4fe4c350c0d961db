//! Serialized model artifacts

use crate::centroid::NearestCentroid;
use crate::linear::SoftmaxLinear;
use crate::predictor::Predictor;
use crate::trees::TreeEnsemble;
use serde::{Deserialize, Serialize};
use signalserve_core::descriptor::is_yaml;
use signalserve_core::{Error, Result};
use std::path::Path;
use std::sync::Arc;

/// A trained model as stored on disk, discriminated by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Multinomial logistic regression
    SoftmaxLinear(SoftmaxLinear),

    /// Gradient-boosted trees
    TreeEnsemble(TreeEnsemble),

    /// Nearest centroid (no probability output)
    NearestCentroid(NearestCentroid),
}

impl ModelArtifact {
    /// Load from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from file; `.yaml`/`.yml` are parsed as YAML, anything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::artifact(format!("cannot read model {}: {}", path.display(), e))
        })?;

        let parsed = if is_yaml(path) {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        };
        parsed.map_err(|e| Error::artifact(format!("cannot decode model {}: {}", path.display(), e)))
    }

    /// Artifact family name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SoftmaxLinear(_) => "softmax_linear",
            Self::TreeEnsemble(_) => "tree_ensemble",
            Self::NearestCentroid(_) => "nearest_centroid",
        }
    }

    /// Validate structure and turn the artifact into a shareable predictor
    pub fn into_predictor(self) -> Result<Arc<dyn Predictor>> {
        match self {
            Self::SoftmaxLinear(model) => {
                model.validate()?;
                Ok(Arc::new(model))
            }
            Self::TreeEnsemble(model) => {
                model.validate()?;
                Ok(Arc::new(model))
            }
            Self::NearestCentroid(model) => {
                model.validate()?;
                Ok(Arc::new(model))
            }
        }
    }
}
