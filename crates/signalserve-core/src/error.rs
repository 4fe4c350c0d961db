//! Error types for SignalServe
//!
//! Caller-facing variants carry the same Spanish wording the public API has
//! always returned in its `error` field.

/// Result type alias using SignalServe's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for SignalServe operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field is absent from the request payload
    #[error("Falta el campo \"{0}\"")]
    MissingField(String),

    /// The payload has the wrong overall shape
    #[error("Petición inválida: {0}")]
    InvalidPayload(String),

    /// A feature value is not a JSON number
    #[error("La feature en la posición {index} no es numérica (se recibió {found})")]
    InvalidFeature { index: usize, found: String },

    /// Feature vector length differs from the descriptor
    #[error("Se esperan {expected} features, se recibieron {received}")]
    ArityMismatch { expected: usize, received: usize },

    /// Predictor output disagrees with the model descriptor
    #[error("model contract violation: {0}")]
    ModelContract(String),

    /// Model artifact could not be decoded or is structurally invalid
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Create a new invalid payload error
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }

    /// Create a new model contract error
    pub fn model_contract(msg: impl Into<String>) -> Self {
        Self::ModelContract(msg.into())
    }

    /// Create a new artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error was caused by the request rather than the model or host
    pub fn is_caller_fault(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::InvalidPayload(_)
                | Self::InvalidFeature { .. }
                | Self::ArityMismatch { .. }
                | Self::Serialization(_)
        )
    }

    /// Short stable name used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::InvalidFeature { .. } => "invalid_feature",
            Self::ArityMismatch { .. } => "arity_mismatch",
            Self::ModelContract(_) => "model_contract",
            Self::Artifact(_) => "artifact",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Yaml(_) => "yaml",
        }
    }
}
