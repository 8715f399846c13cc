//! Observability infrastructure for the price predictor
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcomes, loaded model)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter_vec, register_int_gauge,
    GaugeVec, Histogram, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictorMetricsInner> = OnceLock::new();

struct PredictorMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounterVec,
    prediction_errors_total: IntCounterVec,
    model_info: GaugeVec,
    model_loaded: IntGauge,
}

impl PredictorMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "house_price_prediction_latency_seconds",
                "Time spent encoding, aligning and scoring one request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "house_price_predictions_total",
                "Successful predictions by output currency",
                &["currency"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "house_price_prediction_errors_total",
                "Failed predictions by error kind",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            model_info: register_gauge_vec!(
                "house_price_model_info",
                "Information about the loaded model artifact",
                &["version", "kind"]
            )
            .expect("Failed to register model_info"),

            model_loaded: register_int_gauge!(
                "house_price_model_loaded",
                "1 when a trained artifact is loaded, 0 otherwise"
            )
            .expect("Failed to register model_loaded"),
        }
    }
}

/// Predictor metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share it.
#[derive(Clone)]
pub struct PredictorMetrics {
    _private: (),
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictorMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self, currency: &str) {
        self.inner()
            .predictions_total
            .with_label_values(&[currency])
            .inc();
    }

    pub fn inc_prediction_errors(&self, kind: &str) {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[kind])
            .inc();
    }

    /// Publish the loaded model, or clear it when `None`
    pub fn set_model(&self, loaded: Option<(&str, &str)>) {
        self.inner().model_info.reset();
        match loaded {
            Some((version, kind)) => {
                self.inner()
                    .model_info
                    .with_label_values(&[version, kind])
                    .set(1.0);
                self.inner().model_loaded.set(1);
            }
            None => self.inner().model_loaded.set(0),
        }
    }
}

/// Structured logger for service events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn log_startup(&self, version: &str, port: u16) {
        info!(
            event = "service_started",
            instance = %self.instance,
            service_version = %version,
            port = port,
            "Price prediction service started"
        );
    }

    pub fn log_model_loaded(&self, model_version: &str, kind: &str, columns: usize) {
        info!(
            event = "model_loaded",
            instance = %self.instance,
            model_version = %model_version,
            kind = %kind,
            columns = columns,
            "Trained model loaded"
        );
    }

    pub fn log_model_load_failed(&self, reason: &str) {
        error!(
            event = "model_load_failed",
            instance = %self.instance,
            reason = %reason,
            "Model artifact unavailable, predictions will fail until restart"
        );
    }

    pub fn log_prediction(&self, formatted: &str, currency: &str, model_version: &str, elapsed_us: u128) {
        info!(
            event = "prediction_served",
            instance = %self.instance,
            prediction = %formatted,
            currency = %currency,
            model_version = %model_version,
            elapsed_us = elapsed_us as u64,
            "Served price prediction"
        );
    }

    pub fn log_prediction_failed(&self, kind: &str, message: &str) {
        if kind == "validation" {
            info!(
                event = "prediction_failed",
                instance = %self.instance,
                kind = %kind,
                message = %message,
                "Rejected invalid prediction request"
            );
        } else {
            warn!(
                event = "prediction_failed",
                instance = %self.instance,
                kind = %kind,
                message = %message,
                "Prediction failed"
            );
        }
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Price prediction service shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predictor_metrics_creation() {
        let metrics = PredictorMetrics::new();
        metrics.observe_prediction_latency(0.0002);
        metrics.inc_predictions("USD");
        metrics.inc_prediction_errors("validation");
        metrics.set_model(Some(("v1", "linear")));
        metrics.set_model(None);

        // A second handle shares the registered collectors
        let again = PredictorMetrics::new();
        again.inc_predictions("INR");
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("test-host");
        assert_eq!(logger.instance(), "test-host");
    }
}
