//! Request orchestration
//!
//! Runs one request through Validate -> Encode -> Align -> Infer -> Convert.
//! The first failing stage short-circuits; no partial result is returned.

use crate::artifact::{ModelArtifact, ModelState};
use crate::error::PredictError;
use crate::models::{AttributeRecord, PredictionResult, RawAttributes};
use crate::observability::{PredictorMetrics, StructuredLogger};
use crate::predictor::{
    ColumnAligner, Currency, CurrencyConverter, FeatureEncoder, RegressionModel,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Serves price predictions from an immutable model state
#[derive(Clone)]
pub struct PredictionService {
    state: ModelState,
    encoder: FeatureEncoder,
    aligner: ColumnAligner,
    converter: CurrencyConverter,
    metrics: PredictorMetrics,
    logger: StructuredLogger,
}

impl PredictionService {
    pub fn new(state: ModelState) -> Self {
        Self::with_converter(state, CurrencyConverter::new())
    }

    pub fn with_converter(state: ModelState, converter: CurrencyConverter) -> Self {
        let metrics = PredictorMetrics::new();
        match &state {
            ModelState::Loaded(artifact) => metrics.set_model(Some((artifact.version(), artifact.kind()))),
            ModelState::NotLoaded { .. } => metrics.set_model(None),
        }
        Self {
            state,
            encoder: FeatureEncoder::new(),
            aligner: ColumnAligner::new(),
            converter,
            metrics,
            logger: StructuredLogger::new("prediction-service"),
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    /// Predict from a raw request. `currency` overrides `raw.currency`.
    pub fn predict_price(
        &self,
        raw: &RawAttributes,
        currency: Option<&str>,
    ) -> Result<PredictionResult, PredictError> {
        let code = currency
            .or_else(|| raw.currency.as_ref().map(|c| c.as_str().unwrap_or_default()))
            .unwrap_or("USD");
        self.observe(|| {
            let artifact = self.artifact()?;
            let record = self.encoder.parse(raw)?;
            self.run(artifact, &record, Currency::from_code(code))
        })
    }

    /// Predict from an already validated record
    pub fn predict_record(
        &self,
        record: &AttributeRecord,
        currency: Currency,
    ) -> Result<PredictionResult, PredictError> {
        self.observe(|| {
            let artifact = self.artifact()?;
            self.run(artifact, record, currency)
        })
    }

    fn artifact(&self) -> Result<&Arc<ModelArtifact>, PredictError> {
        match &self.state {
            ModelState::Loaded(artifact) => Ok(artifact),
            ModelState::NotLoaded { reason } => Err(PredictError::ModelNotLoaded(reason.clone())),
        }
    }

    fn run(
        &self,
        artifact: &ModelArtifact,
        record: &AttributeRecord,
        currency: Currency,
    ) -> Result<PredictionResult, PredictError> {
        let encoded = self.encoder.encode(record);
        let aligned = self.aligner.align(&encoded, artifact.schema());
        let dropped = self.aligner.dropped_columns(&encoded, artifact.schema());
        if !dropped.is_empty() {
            debug!(dropped = ?dropped, "Columns unknown to the model were dropped");
        }

        let price_usd = artifact.model().predict(&aligned)?;
        let formatted = self.converter.convert(price_usd, currency);

        Ok(PredictionResult {
            amount: formatted.amount,
            currency: formatted.currency.code().to_string(),
            formatted: formatted.display,
            model_version: artifact.version().to_string(),
        })
    }

    fn observe<F>(&self, f: F) -> Result<PredictionResult, PredictError>
    where
        F: FnOnce() -> Result<PredictionResult, PredictError>,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        match &result {
            Ok(prediction) => {
                self.metrics.observe_prediction_latency(elapsed.as_secs_f64());
                self.metrics.inc_predictions(&prediction.currency);
                self.logger.log_prediction(
                    &prediction.formatted,
                    &prediction.currency,
                    &prediction.model_version,
                    elapsed.as_micros(),
                );
            }
            Err(e) => {
                self.metrics.inc_prediction_errors(e.kind());
                self.logger.log_prediction_failed(e.kind(), &e.to_string());
            }
        }
        result
    }
}
