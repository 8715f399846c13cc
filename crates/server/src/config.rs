//! Server configuration

use anyhow::{Context, Result};
use predictor_lib::artifact::{ArtifactConfig, DEFAULT_MAX_MODEL_BYTES};
use predictor_lib::predictor::{CurrencyConfig, DEFAULT_INR_RATE};
use serde::Deserialize;
use std::path::PathBuf;

/// Optional config file, looked up in the working directory
pub const CONFIG_FILE: &str = "predictor";

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Instance name used in log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// HTTP port for predictions, health and metrics
    #[serde(default = "default_port")]
    pub port: u16,

    /// Serialized trained model
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Serialized column list the model was trained on
    #[serde(default = "default_columns_path")]
    pub columns_path: PathBuf,

    /// Expected SHA-256 of the model file
    #[serde(default)]
    pub model_sha256: Option<String>,

    /// Upper bound on the model file size in bytes
    #[serde(default = "default_max_model_bytes")]
    pub max_model_bytes: usize,

    /// Rupees per dollar
    #[serde(default = "default_inr_rate")]
    pub inr_rate: f64,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "price-server".to_string())
}

fn default_port() -> u16 {
    8080
}

fn default_model_path() -> PathBuf {
    PathBuf::from("artifacts/model.json")
}

fn default_columns_path() -> PathBuf {
    PathBuf::from("artifacts/model_columns.json")
}

fn default_max_model_bytes() -> usize {
    DEFAULT_MAX_MODEL_BYTES
}

fn default_inr_rate() -> f64 {
    DEFAULT_INR_RATE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            port: default_port(),
            model_path: default_model_path(),
            columns_path: default_columns_path(),
            model_sha256: None,
            max_model_bytes: default_max_model_bytes(),
            inr_rate: default_inr_rate(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `predictor.toml` (optional) and `PREDICTOR_*` env vars
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix("PREDICTOR"))
            .build()
            .context("Failed to read configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.inr_rate.is_finite() && self.inr_rate > 0.0) {
            anyhow::bail!("inr_rate must be a positive number, got {}", self.inr_rate);
        }
        Ok(())
    }

    pub fn artifact_config(&self) -> ArtifactConfig {
        ArtifactConfig {
            model_path: self.model_path.clone(),
            columns_path: self.columns_path.clone(),
            expected_sha256: self.model_sha256.clone().filter(|s| !s.trim().is_empty()),
            max_model_bytes: self.max_model_bytes,
        }
    }

    pub fn currency_config(&self) -> CurrencyConfig {
        CurrencyConfig {
            inr_rate: self.inr_rate,
        }
    }
}
