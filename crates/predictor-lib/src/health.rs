//! Health checks for the prediction service
//!
//! Liveness and readiness are derived from the model state: the process is
//! alive as long as it serves requests, and ready only once a trained
//! artifact is loaded.

use crate::artifact::ModelState;
use serde::{Deserialize, Serialize};

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is running but cannot do useful work
    Degraded,
}

/// Details about the loaded model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,
    /// Unix timestamp of the artifact load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub model: ModelHealth,
    pub checked_at: i64,
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Health of a process holding `state`
pub fn health(state: &ModelState) -> HealthResponse {
    let model = match state {
        ModelState::Loaded(artifact) => ModelHealth {
            status: ComponentStatus::Healthy,
            version: Some(artifact.version().to_string()),
            kind: Some(artifact.kind().to_string()),
            columns: Some(artifact.schema().len()),
            loaded_at: Some(artifact.loaded_at()),
            message: None,
        },
        ModelState::NotLoaded { reason } => ModelHealth {
            status: ComponentStatus::Degraded,
            version: None,
            kind: None,
            columns: None,
            loaded_at: None,
            message: Some(reason.clone()),
        },
    };

    HealthResponse {
        status: model.status,
        model,
        checked_at: chrono::Utc::now().timestamp(),
    }
}

/// Ready only when a trained artifact is loaded
pub fn readiness(state: &ModelState) -> ReadinessResponse {
    match state {
        ModelState::Loaded(_) => ReadinessResponse {
            ready: true,
            reason: None,
        },
        ModelState::NotLoaded { reason } => ReadinessResponse {
            ready: false,
            reason: Some(format!("Model not loaded: {}", reason)),
        },
    }
}
