//! Trained model artifacts
//!
//! A trained artifact is two JSON files written by the offline training
//! job: the serialized model and the ordered list of feature columns it was
//! fitted on. Both are loaded together or not at all, checked against each
//! other, and then shared read-only for the life of the process.

use crate::models::{ColumnSchema, SchemaError};
use crate::predictor::{RegressionModel, TrainedModel};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Default upper bound on the model file size (64MB)
pub const DEFAULT_MAX_MODEL_BYTES: usize = 64 * 1024 * 1024;

/// Errors raised while loading a trained artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model file is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("invalid column schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("model expects {model} features but the schema has {schema} columns")]
    SchemaMismatch { model: usize, schema: usize },
}

/// Where to find a trained artifact and how to verify it
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub model_path: PathBuf,
    pub columns_path: PathBuf,
    /// Expected SHA-256 of the model file, hex encoded
    pub expected_sha256: Option<String>,
    pub max_model_bytes: usize,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("artifacts/model.json"),
            columns_path: PathBuf::from("artifacts/model_columns.json"),
            expected_sha256: None,
            max_model_bytes: DEFAULT_MAX_MODEL_BYTES,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelFile {
    #[serde(default = "default_version")]
    version: String,
    #[serde(flatten)]
    model: TrainedModel,
}

fn default_version() -> String {
    "unversioned".to_string()
}

/// A trained model together with the column schema it was fitted on
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    version: String,
    model: TrainedModel,
    schema: ColumnSchema,
    checksum: String,
    loaded_at: i64,
}

impl ModelArtifact {
    /// Pair a model with its schema, rejecting mismatched widths
    pub fn new(
        version: impl Into<String>,
        model: TrainedModel,
        schema: ColumnSchema,
    ) -> Result<Self, ArtifactError> {
        model.validate().map_err(ArtifactError::InvalidModel)?;
        if model.n_features() != schema.len() {
            return Err(ArtifactError::SchemaMismatch {
                model: model.n_features(),
                schema: schema.len(),
            });
        }
        Ok(Self {
            version: version.into(),
            model,
            schema,
            checksum: String::new(),
            loaded_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Load model and columns files; both succeed or the whole load fails
    pub fn load(config: &ArtifactConfig) -> Result<Self, ArtifactError> {
        let model_bytes = read(&config.model_path)?;
        if model_bytes.len() > config.max_model_bytes {
            return Err(ArtifactError::TooLarge {
                size: model_bytes.len(),
                limit: config.max_model_bytes,
            });
        }

        let checksum = compute_checksum(&model_bytes);
        if let Some(expected) = &config.expected_sha256 {
            if !expected.trim().eq_ignore_ascii_case(&checksum) {
                return Err(ArtifactError::ChecksumMismatch {
                    expected: expected.trim().to_string(),
                    actual: checksum,
                });
            }
            debug!(checksum = %checksum, "Model checksum validated");
        }

        let model_file: ModelFile = parse(&config.model_path, &model_bytes)?;
        let columns_bytes = read(&config.columns_path)?;
        let columns: Vec<String> = parse(&config.columns_path, &columns_bytes)?;
        let schema = ColumnSchema::new(columns)?;

        let mut artifact = Self::new(model_file.version, model_file.model, schema)?;
        artifact.checksum = checksum;

        info!(
            version = %artifact.version,
            kind = artifact.kind(),
            columns = artifact.schema.len(),
            checksum = %artifact.checksum,
            "Model artifact loaded"
        );
        Ok(artifact)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn kind(&self) -> &'static str {
        self.model.kind()
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// SHA-256 of the model file, empty for in-memory artifacts
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn loaded_at(&self) -> i64 {
        self.loaded_at
    }
}

/// Process-wide model state handed to the prediction service
#[derive(Debug, Clone)]
pub enum ModelState {
    Loaded(Arc<ModelArtifact>),
    NotLoaded { reason: String },
}

impl ModelState {
    /// Load the artifact, recording the failure instead of returning it
    pub fn load(config: &ArtifactConfig) -> Self {
        match ModelArtifact::load(config) {
            Ok(artifact) => ModelState::Loaded(Arc::new(artifact)),
            Err(e) => ModelState::NotLoaded {
                reason: e.to_string(),
            },
        }
    }

    pub fn not_loaded(reason: impl Into<String>) -> Self {
        ModelState::NotLoaded {
            reason: reason.into(),
        }
    }

    pub fn artifact(&self) -> Option<&Arc<ModelArtifact>> {
        match self {
            ModelState::Loaded(artifact) => Some(artifact),
            ModelState::NotLoaded { .. } => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Loaded(_))
    }
}

impl From<ModelArtifact> for ModelState {
    fn from(artifact: ModelArtifact) -> Self {
        ModelState::Loaded(Arc::new(artifact))
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Hex encoded SHA-256 of a byte slice
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
