//! Multinomial logistic regression (softmax over linear logits)

use crate::predictor::{argmax, check_finite, check_width, softmax, FeatureBatch, Predictor, ProbabilityError};
use serde::{Deserialize, Serialize};
use signalserve_core::{Error, Result};

/// Linear model with one weight row per class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftmaxLinear {
    /// `weights[class][feature]`
    pub weights: Vec<Vec<f64>>,

    /// One bias per class
    pub intercepts: Vec<f64>,
}

impl SoftmaxLinear {
    /// Build and validate a linear model
    pub fn new(weights: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Result<Self> {
        let model = Self { weights, intercepts };
        model.validate()?;
        Ok(model)
    }

    /// Check that all weight rows have the same width and match the intercepts
    pub fn validate(&self) -> Result<()> {
        let width = self
            .weights
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::artifact("softmax_linear has no weight rows"))?;

        if width == 0 {
            return Err(Error::artifact("softmax_linear weight rows are empty"));
        }
        if let Some(pos) = self.weights.iter().position(|row| row.len() != width) {
            return Err(Error::artifact(format!(
                "softmax_linear weight row {} has {} entries, expected {}",
                pos,
                self.weights[pos].len(),
                width
            )));
        }
        if self.intercepts.len() != self.weights.len() {
            return Err(Error::artifact(format!(
                "softmax_linear has {} intercepts for {} classes",
                self.intercepts.len(),
                self.weights.len()
            )));
        }
        Ok(())
    }

    /// Per-class logits for one row, failing when the dot products overflow
    fn logits(&self, row: &[f64]) -> std::result::Result<Vec<f64>, String> {
        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| w.iter().zip(row).map(|(wi, xi)| wi * xi).sum::<f64>() + b)
            .collect();
        check_finite(&logits, "logit")?;
        Ok(logits)
    }

    fn width(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }
}

impl Predictor for SoftmaxLinear {
    fn predict_class(&self, batch: &FeatureBatch<'_>) -> Result<Vec<usize>> {
        batch
            .rows()
            .iter()
            .map(|row| {
                check_width(row, self.width())?;
                let logits = self.logits(row).map_err(Error::model_contract)?;
                Ok(argmax(&logits))
            })
            .collect()
    }

    fn predict_probabilities(
        &self,
        batch: &FeatureBatch<'_>,
    ) -> std::result::Result<Vec<Vec<f64>>, ProbabilityError> {
        batch
            .rows()
            .iter()
            .map(|row| {
                check_width(row, self.width())
                    .map_err(|e| ProbabilityError::Failed(e.to_string()))?;
                let probabilities = softmax(&self.logits(row).map_err(ProbabilityError::Failed)?);
                check_finite(&probabilities, "probability").map_err(ProbabilityError::Failed)?;
                Ok(probabilities)
            })
            .collect()
    }

    fn model_type(&self) -> &str {
        "softmax_linear"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.width())
    }

    fn n_classes(&self) -> Option<usize> {
        Some(self.weights.len())
    }
}
