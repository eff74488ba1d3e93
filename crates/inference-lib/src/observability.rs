//! Observability infrastructure for the prediction service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcomes, loaded models, load failures)
//! - Structured JSON logging with tracing

use crate::models::{ErrorKind, PredictionResult, Task};
use crate::registry::{LoadOutcome, LoadStatus};
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    HistogramVec, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{error, info, warn};

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictionMetricsInner> = OnceLock::new();

struct PredictionMetricsInner {
    prediction_latency_seconds: HistogramVec,
    predictions_total: IntCounterVec,
    models_loaded: IntGauge,
    artifact_load_failures: IntCounter,
}

impl PredictionMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram_vec!(
                "jobpred_prediction_latency_seconds",
                "Time spent serving one prediction, validation included",
                &["task"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "jobpred_predictions_total",
                "Predictions served, by task and outcome",
                &["task", "outcome"]
            )
            .expect("Failed to register predictions_total"),

            models_loaded: register_int_gauge!(
                "jobpred_models_loaded",
                "Number of model artifacts currently loaded"
            )
            .expect("Failed to register models_loaded"),

            artifact_load_failures: register_int_counter!(
                "jobpred_artifact_load_failures_total",
                "Artifacts that were present but could not be decoded"
            )
            .expect("Failed to register artifact_load_failures"),
        }
    }
}

/// Outcome label for a served result
pub fn outcome_label(result: &PredictionResult) -> &'static str {
    match result.error_kind {
        None if result.success => "success",
        None => ErrorKind::Inference.as_str(),
        Some(kind) => kind.as_str(),
    }
}

/// Handle to the global prediction metrics; clones share the same metrics
#[derive(Clone)]
pub struct PredictionMetrics {
    _private: (),
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictionMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictionMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictionMetricsInner::new)
    }

    pub fn observe_prediction(&self, task: Task, result: &PredictionResult, elapsed: Duration) {
        let inner = self.inner();
        inner
            .prediction_latency_seconds
            .with_label_values(&[task.as_str()])
            .observe(elapsed.as_secs_f64());
        inner
            .predictions_total
            .with_label_values(&[task.as_str(), outcome_label(result)])
            .inc();
    }

    /// Publish the registry's load report
    pub fn record_load_report(&self, report: &[LoadOutcome]) {
        let inner = self.inner();
        let loaded = report.iter().filter(|o| o.is_loaded()).count();
        inner.models_loaded.set(loaded as i64);
        let failed = report
            .iter()
            .filter(|o| o.status == LoadStatus::Failed)
            .count();
        inner.artifact_load_failures.inc_by(failed as u64);
    }

    pub fn models_loaded(&self) -> i64 {
        self.inner().models_loaded.get()
    }

    pub fn predictions_served(&self, task: Task, outcome: &str) -> u64 {
        self.inner()
            .predictions_total
            .with_label_values(&[task.as_str(), outcome])
            .get()
    }
}

/// Structured logger for service events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, bind: &str, models_loaded: usize) {
        info!(
            event = "service_started",
            instance = %self.instance,
            service_version = %version,
            bind = %bind,
            models_loaded = models_loaded,
            "Prediction service started"
        );
    }

    /// One event per configured artifact
    pub fn log_load_report(&self, report: &[LoadOutcome]) {
        for outcome in report {
            match outcome.status {
                LoadStatus::Loaded => info!(
                    event = "artifact_loaded",
                    instance = %self.instance,
                    artifact = %outcome.name,
                    decoder = outcome.decoder.as_deref().unwrap_or("unknown"),
                    features = ?outcome.feature_count,
                    version = ?outcome.version,
                    sha256 = ?outcome.sha256,
                    "Model artifact loaded"
                ),
                LoadStatus::Missing => warn!(
                    event = "artifact_unavailable",
                    instance = %self.instance,
                    artifact = %outcome.name,
                    status = "missing",
                    error = outcome.error.as_deref().unwrap_or(""),
                    "Model artifact unavailable"
                ),
                LoadStatus::Failed => error!(
                    event = "artifact_unavailable",
                    instance = %self.instance,
                    artifact = %outcome.name,
                    status = "failed",
                    error = outcome.error.as_deref().unwrap_or(""),
                    "Model artifact unavailable"
                ),
            }
        }
    }

    pub fn log_prediction(&self, task: Task, result: &PredictionResult, elapsed: Duration) {
        let outcome = outcome_label(result);
        if result.success {
            info!(
                event = "prediction_served",
                instance = %self.instance,
                task = %task,
                outcome = outcome,
                confidence = ?result.confidence,
                latency_ms = elapsed.as_secs_f64() * 1000.0,
                "Prediction served"
            );
        } else {
            warn!(
                event = "prediction_served",
                instance = %self.instance,
                task = %task,
                outcome = outcome,
                error = result.error.as_deref().unwrap_or(""),
                latency_ms = elapsed.as_secs_f64() * 1000.0,
                "Prediction failed"
            );
        }
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Prediction service shutting down"
        );
    }
}
