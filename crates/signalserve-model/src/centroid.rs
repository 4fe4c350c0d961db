//! Nearest-centroid classifier. Has no probability output.

use crate::predictor::{check_width, FeatureBatch, Predictor, ProbabilityError};
use serde::{Deserialize, Serialize};
use signalserve_core::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestCentroid {
    /// `centroids[class][feature]`
    pub centroids: Vec<Vec<f64>>,
}

impl NearestCentroid {
    pub fn new(centroids: Vec<Vec<f64>>) -> Result<Self> {
        let model = Self { centroids };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        let width = self
            .centroids
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::artifact("nearest_centroid has no centroids"))?;

        if width == 0 {
            return Err(Error::artifact("nearest_centroid centroids are empty"));
        }
        if self.centroids.iter().any(|c| c.len() != width) {
            return Err(Error::artifact("nearest_centroid centroids differ in width"));
        }
        Ok(())
    }

    fn width(&self) -> usize {
        self.centroids.first().map_or(0, Vec::len)
    }

    fn nearest(&self, row: &[f64]) -> usize {
        let distance = |c: &[f64]| -> f64 {
            c.iter().zip(row).map(|(a, b)| (a - b) * (a - b)).sum()
        };

        let mut best = 0;
        let mut best_distance = distance(&self.centroids[0][..]);
        for (i, centroid) in self.centroids.iter().enumerate().skip(1) {
            let d = distance(&centroid[..]);
            if d < best_distance {
                best = i;
                best_distance = d;
            }
        }
        best
    }
}

impl Predictor for NearestCentroid {
    fn predict_class(&self, batch: &FeatureBatch<'_>) -> Result<Vec<usize>> {
        batch
            .rows()
            .iter()
            .map(|row| {
                check_width(row, self.width())?;
                Ok(self.nearest(row))
            })
            .collect()
    }

    fn predict_probabilities(
        &self,
        _batch: &FeatureBatch<'_>,
    ) -> std::result::Result<Vec<Vec<f64>>, ProbabilityError> {
        Err(ProbabilityError::Unsupported(self.model_type().to_string()))
    }

    fn model_type(&self) -> &str {
        "nearest_centroid"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.width())
    }

    fn n_classes(&self) -> Option<usize> {
        Some(self.centroids.len())
    }
}
