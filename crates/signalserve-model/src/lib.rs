//! SignalServe Model
//!
//! Predictors for tabular classification models and the request pipeline
//! that turns their raw output into labelled predictions.
//!
//! Bundled model families:
//! - `softmax_linear`: multinomial logistic regression, with probabilities
//! - `tree_ensemble`: gradient-boosted trees, with probabilities
//! - `nearest_centroid`: distance-based, no probability output
//!
//! All predictors are immutable after loading and safe to share across threads.

pub mod artifact;
pub mod centroid;
pub mod linear;
pub mod loader;
pub mod predictor;
pub mod service;
pub mod trees;

pub use artifact::ModelArtifact;
pub use centroid::NearestCentroid;
pub use linear::SoftmaxLinear;
pub use loader::{check_compatibility, load_model, LoadedModel};
pub use predictor::{FeatureBatch, Predictor, ProbabilityError};
pub use service::{to_percentage, PredictionService};
pub use trees::{Tree, TreeEnsemble, TreeNode};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::predictor::{FeatureBatch, Predictor, ProbabilityError};
    pub use crate::service::PredictionService;
    pub use crate::loader::{load_model, LoadedModel};
}
