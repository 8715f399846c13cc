//! Core library for house price prediction
//!
//! This crate provides:
//! - Feature encoding of raw house attributes
//! - Alignment of encoded records to a training-time column schema
//! - Linear and tree-ensemble regressors loaded from trained artifacts
//! - Currency conversion and formatting of predictions
//! - Request orchestration, health checks and observability

pub mod artifact;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod service;

pub use artifact::{ArtifactConfig, ArtifactError, ModelArtifact, ModelState};
pub use error::PredictError;
pub use health::{ComponentStatus, HealthResponse, ModelHealth, ReadinessResponse};
pub use models::*;
pub use observability::{PredictorMetrics, StructuredLogger};
pub use service::PredictionService;
