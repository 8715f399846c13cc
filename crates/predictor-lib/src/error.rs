//! Error taxonomy for the prediction pipeline

use thiserror::Error;

/// Failure of a single prediction request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// A request attribute was missing or malformed
    #[error("invalid value for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// No trained artifact is available in this process
    #[error("model not loaded: {0}")]
    ModelNotLoaded(String),

    /// Inference failed unexpectedly
    #[error("prediction failed: {0}")]
    Prediction(String),
}

impl PredictError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn prediction(cause: impl Into<String>) -> Self {
        Self::Prediction(cause.into())
    }

    /// True when the caller, not the service, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Short label used for metrics and log events
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::ModelNotLoaded(_) => "model_not_loaded",
            Self::Prediction(_) => "prediction",
        }
    }
}
