//! SignalServe Core
//!
//! Core types shared across SignalServe components.
//!
//! This crate provides:
//! - The model descriptor published alongside every trained model
//! - Typed prediction requests and the public response shape
//! - Error types and result handling

pub mod descriptor;
pub mod error;
pub mod types;

pub use descriptor::ModelDescriptor;
pub use error::{Error, Result};
pub use types::{ErrorResponse, LabeledValues, PredictionRequest, PredictionResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::descriptor::ModelDescriptor;
    pub use crate::error::{Error, Result};
    pub use crate::types::{LabeledValues, PredictionRequest, PredictionResult};
}
