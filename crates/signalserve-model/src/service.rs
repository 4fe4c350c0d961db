//! Prediction request pipeline
//!
//! Validates a request against the descriptor's feature contract, runs the
//! predictor on a single-row batch and assembles the labelled response.
//! Probability output is best-effort: a model that cannot produce it yields
//! `probabilities: None` instead of an error.

use crate::predictor::{FeatureBatch, Predictor, ProbabilityError};
use serde_json::Value;
use signalserve_core::{
    Error, LabeledValues, ModelDescriptor, PredictionRequest, PredictionResult, Result,
};
use std::sync::Arc;
use tracing::debug;

/// Stateless prediction service over an injected descriptor and predictor
#[derive(Clone)]
pub struct PredictionService {
    descriptor: Arc<ModelDescriptor>,
    predictor: Arc<dyn Predictor>,
}

impl PredictionService {
    pub fn new(descriptor: Arc<ModelDescriptor>, predictor: Arc<dyn Predictor>) -> Self {
        Self {
            descriptor,
            predictor,
        }
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    pub fn predictor(&self) -> &dyn Predictor {
        self.predictor.as_ref()
    }

    /// Parse a raw JSON payload and predict
    pub fn predict_json(&self, payload: &Value) -> Result<PredictionResult> {
        let request = PredictionRequest::from_json(payload)?;
        self.predict(&request)
    }

    /// Predict a single feature vector
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        let expected = self.descriptor.feature_count();
        if request.len() != expected {
            return Err(Error::ArityMismatch {
                expected,
                received: request.len(),
            });
        }

        let batch = FeatureBatch::single(&request.features);

        let predicted_index = self.predict_index(&batch)?;
        let predicted_label = self
            .descriptor
            .class_label(predicted_index)
            .ok_or_else(|| {
                Error::model_contract(format!(
                    "class index {} outside the {} declared classes",
                    predicted_index,
                    self.descriptor.class_count()
                ))
            })?
            .to_string();

        let probabilities = self.probabilities(&batch)?;

        let color = self
            .descriptor
            .class_color(predicted_index)
            .ok_or_else(|| {
                Error::model_contract(format!("no class color for class index {}", predicted_index))
            })?
            .to_string();

        let echoed_features = self
            .descriptor
            .features
            .iter()
            .cloned()
            .zip(request.features.iter().copied())
            .collect();

        debug!(
            "Predicted {} (index {}) with probabilities {}",
            predicted_label,
            predicted_index,
            if probabilities.is_some() { "available" } else { "unavailable" }
        );

        Ok(PredictionResult {
            predicted_label,
            predicted_index,
            color,
            probabilities,
            echoed_features,
        })
    }

    fn predict_index(&self, batch: &FeatureBatch<'_>) -> Result<usize> {
        let classes = self
            .predictor
            .predict_class(batch)
            .map_err(|e| Error::model_contract(format!("predictor failed: {}", e)))?;

        classes
            .first()
            .copied()
            .ok_or_else(|| Error::model_contract("predictor returned no class for the input row"))
    }

    fn probabilities(&self, batch: &FeatureBatch<'_>) -> Result<Option<LabeledValues>> {
        let rows = match self.predictor.predict_probabilities(batch) {
            Ok(rows) => rows,
            Err(ProbabilityError::Unsupported(model)) => {
                debug!("Probabilities unavailable for model '{}'", model);
                return Ok(None);
            }
            Err(ProbabilityError::Failed(reason)) => {
                return Err(Error::model_contract(format!(
                    "probability computation failed: {}",
                    reason
                )));
            }
        };

        let row = rows.into_iter().next().ok_or_else(|| {
            Error::model_contract("predictor returned no probabilities for the input row")
        })?;

        if row.len() != self.descriptor.class_count() {
            return Err(Error::model_contract(format!(
                "predictor returned {} probabilities for {} classes",
                row.len(),
                self.descriptor.class_count()
            )));
        }

        if let Some(pos) = row.iter().position(|p| !p.is_finite()) {
            return Err(Error::model_contract(format!(
                "predictor returned a non-finite probability for class {}",
                pos
            )));
        }

        Ok(Some(
            self.descriptor
                .classes
                .iter()
                .cloned()
                .zip(row.into_iter().map(to_percentage))
                .collect(),
        ))
    }
}

/// Convert a probability to a percentage rounded to two decimals
pub fn to_percentage(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}
