//! Request and response types for the prediction API

use crate::error::{Error, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Name of the only required request field
pub const FEATURES_FIELD: &str = "features";

/// A validated feature vector submitted for prediction
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    /// Feature values in descriptor order
    pub features: Vec<f64>,
}

impl PredictionRequest {
    /// Create a request from an already-typed vector
    pub fn new(features: Vec<f64>) -> Self {
        Self { features }
    }

    /// Parse a raw JSON payload.
    ///
    /// Only shape is checked here; arity is checked against the descriptor
    /// by the prediction service.
    pub fn from_json(payload: &Value) -> Result<Self> {
        let object = payload
            .as_object()
            .ok_or_else(|| Error::invalid_payload("se esperaba un objeto JSON"))?;

        let raw = object
            .get(FEATURES_FIELD)
            .ok_or_else(|| Error::missing_field(FEATURES_FIELD))?;

        let items = raw.as_array().ok_or_else(|| {
            Error::invalid_payload(format!("\"{}\" debe ser una lista", FEATURES_FIELD))
        })?;

        let features = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_f64().ok_or_else(|| Error::InvalidFeature {
                    index,
                    found: json_type_name(item).to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { features })
    }

    /// Number of supplied values
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether no values were supplied
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Ordered label → value pairs, serialized as a JSON object in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledValues(Vec<(String, f64)>);

impl LabeledValues {
    /// Create an empty collection with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Append an entry
    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.0.push((label.into(), value));
    }

    /// Value for a label
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| *value)
    }

    /// Iterate over entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Labels in insertion order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    /// Sum of all values
    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, value)| value).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for LabeledValues {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for LabeledValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in &self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Successful prediction, serialized with the public API's field names
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictionResult {
    /// Human-readable class label
    #[serde(rename = "prediccion")]
    pub predicted_label: String,

    /// Class index produced by the model
    #[serde(rename = "prediccion_numerica")]
    pub predicted_index: usize,

    /// Display color for the predicted class
    #[serde(rename = "clase_color")]
    pub color: String,

    /// Per-class percentages (0-100, 2 decimals), `null` when the model has none
    #[serde(rename = "probabilidades")]
    pub probabilities: Option<LabeledValues>,

    /// Feature name → supplied value, in descriptor order
    #[serde(rename = "features_recibidas")]
    pub echoed_features: LabeledValues,
}

/// Uniform error body returned for every failed request
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}
