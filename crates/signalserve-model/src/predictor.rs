//! Predictor trait and common types

use signalserve_core::Result;

/// Trait for every loaded model
///
/// Implementations must be safe to call from many request handlers at once;
/// all bundled model families are immutable after loading.
pub trait Predictor: Send + Sync {
    /// Predict a class index for every row of the batch
    fn predict_class(&self, batch: &FeatureBatch<'_>) -> Result<Vec<usize>>;

    /// Predict a probability distribution over classes for every row
    fn predict_probabilities(
        &self,
        batch: &FeatureBatch<'_>,
    ) -> std::result::Result<Vec<Vec<f64>>, ProbabilityError>;

    /// Model family name
    fn model_type(&self) -> &str;

    /// Expected row width, when the model knows it
    fn n_features(&self) -> Option<usize> {
        None
    }

    /// Number of classes the model can emit, when the model knows it
    fn n_classes(&self) -> Option<usize> {
        None
    }
}

/// Why a probability distribution could not be produced
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbabilityError {
    /// The model family has no calibrated probability output
    #[error("model '{0}' does not produce probabilities")]
    Unsupported(String),

    /// The model supports probabilities but computing them failed
    #[error("probability computation failed: {0}")]
    Failed(String),
}

/// Row-major batch of feature vectors borrowed from the caller
#[derive(Debug, Clone)]
pub struct FeatureBatch<'a> {
    rows: Vec<&'a [f64]>,
}

impl<'a> FeatureBatch<'a> {
    /// Batch of exactly one row
    pub fn single(row: &'a [f64]) -> Self {
        Self { rows: vec![row] }
    }

    /// Batch from several rows
    pub fn from_rows(rows: impl IntoIterator<Item = &'a [f64]>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    /// Rows in submission order
    pub fn rows(&self) -> &[&'a [f64]] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Index of the largest value; ties go to the lowest index
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = i;
        }
    }
    best
}

/// Numerically stable softmax
pub(crate) fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Reject scores that overflowed or went NaN
pub(crate) fn check_finite(scores: &[f64], what: &str) -> std::result::Result<(), String> {
    match scores.iter().position(|s| !s.is_finite()) {
        Some(class) => Err(format!("{} for class {} is not finite ({})", what, class, scores[class])),
        None => Ok(()),
    }
}

/// Ensure a row has the width the model was trained on
pub(crate) fn check_width(row: &[f64], expected: usize) -> Result<()> {
    if row.len() == expected {
        Ok(())
    } else {
        Err(signalserve_core::Error::ArityMismatch {
            expected,
            received: row.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_prefers_first_on_tie() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[1.0]), 0);
        assert_eq!(argmax(&[-3.0, -1.0, -2.0]), 1);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let total: f64 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_large_logits() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_check_finite() {
        assert!(check_finite(&[0.0, -3.5, 1e300], "logit").is_ok());

        let err = check_finite(&[1.0, f64::INFINITY], "logit").unwrap_err();
        assert!(err.contains("class 1"));
        assert!(check_finite(&[f64::NAN], "margin").is_err());
    }

    #[test]
    fn test_single_batch() {
        let row = [1.0, 2.0];
        let batch = FeatureBatch::single(&row);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.rows()[0], &[1.0, 2.0]);
    }
}
