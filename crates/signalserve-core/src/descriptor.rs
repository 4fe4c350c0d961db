//! Model descriptor: the static metadata published alongside a trained model

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

/// Metadata describing a model's input contract and output labelling.
///
/// Loaded once at startup and shared read-only by every request. Keys that
/// are not modelled explicitly (training date, accuracy, ...) are preserved
/// in `extra` so the descriptor can be served back verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDescriptor {
    /// Model family name, e.g. "XGBoost"
    #[serde(default)]
    pub model_type: String,

    /// Ordered feature names; position `i` of a request vector maps to `features[i]`
    pub features: Vec<String>,

    /// Ordered class labels; class index `i` maps to `classes[i]`
    pub classes: Vec<String>,

    /// Display color per class index (keyed by the index rendered as a string)
    #[serde(default)]
    pub class_colors: BTreeMap<String, String>,

    /// Any additional descriptor keys
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ModelDescriptor {
    /// Create a descriptor without extra metadata
    pub fn new(
        model_type: impl Into<String>,
        features: Vec<String>,
        classes: Vec<String>,
        class_colors: BTreeMap<String, String>,
    ) -> Self {
        Self {
            model_type: model_type.into(),
            features,
            classes,
            class_colors,
            extra: BTreeMap::new(),
        }
    }

    /// Load from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptor: Self = serde_json::from_str(json)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let descriptor: Self = serde_yaml::from_str(yaml)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Load from file; `.yaml`/`.yml` are parsed as YAML, anything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading model descriptor from {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read descriptor {}: {}", path.display(), e))
        })?;

        if is_yaml(path) {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Check the structural invariants every request relies on
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(Error::config("descriptor declares no features"));
        }
        if self.classes.is_empty() {
            return Err(Error::config("descriptor declares no classes"));
        }

        let mut seen = HashSet::with_capacity(self.features.len());
        for name in &self.features {
            if name.trim().is_empty() {
                return Err(Error::config("descriptor contains an empty feature name"));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::config(format!("duplicate feature name '{}'", name)));
            }
        }

        Ok(())
    }

    /// Number of features a request vector must carry
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Number of classes the model distinguishes
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Label for a class index, if in range
    pub fn class_label(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// Display color for a class index, if configured
    pub fn class_color(&self, index: usize) -> Option<&str> {
        self.class_colors.get(&index.to_string()).map(String::as_str)
    }

    /// Class indices with no color entry
    pub fn uncolored_classes(&self) -> Vec<usize> {
        (0..self.classes.len())
            .filter(|i| self.class_color(*i).is_none())
            .collect()
    }
}

/// Whether a path names a YAML document
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
        })
}
