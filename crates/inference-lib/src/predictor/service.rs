use super::{
    BenefitsPredictor, CampaignPredictor, CompanyGrowthPredictor, DegreePredictor,
    HealthInsurancePredictor, JobTitlePredictor, Predictor, RemoteWorkPredictor,
    RevenueGrowthPredictor, SalaryPredictor,
};
use crate::error::{PredictionError, UnknownTask};
use crate::features::{Clock, SystemClock};
use crate::models::{PredictionRequest, PredictionResult, Task};
use crate::observability::{PredictionMetrics, StructuredLogger};
use crate::output::ResultFormatter;
use crate::registry::ModelRegistry;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

/// Entry point serving every task over one shared registry
pub struct PredictionService {
    registry: Arc<ModelRegistry>,
    predictors: BTreeMap<Task, Box<dyn Predictor>>,
    clock: Arc<dyn Clock>,
    metrics: PredictionMetrics,
    logger: Option<StructuredLogger>,
}

impl PredictionService {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self::with_clock(registry, Arc::new(SystemClock))
    }

    pub fn with_clock(registry: Arc<ModelRegistry>, clock: Arc<dyn Clock>) -> Self {
        let predictors: Vec<Box<dyn Predictor>> = vec![
            Box::new(SalaryPredictor::new(registry.clone(), clock.clone())),
            Box::new(RemoteWorkPredictor::new(registry.clone(), clock.clone())),
            Box::new(DegreePredictor::new(registry.clone(), clock.clone())),
            Box::new(HealthInsurancePredictor::new(registry.clone(), clock.clone())),
            Box::new(CampaignPredictor::new(registry.clone(), clock.clone())),
            Box::new(CompanyGrowthPredictor::new(registry.clone(), clock.clone())),
            Box::new(RevenueGrowthPredictor::new(registry.clone(), clock.clone())),
            Box::new(BenefitsPredictor::new(registry.clone(), clock.clone())),
            Box::new(JobTitlePredictor::new(registry.clone(), clock.clone())),
        ];

        Self {
            registry,
            predictors: predictors.into_iter().map(|p| (p.task(), p)).collect(),
            clock,
            metrics: PredictionMetrics::new(),
            logger: None,
        }
    }

    /// Emit a `prediction_served` event per call
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn predictor(&self, task: Task) -> Option<&dyn Predictor> {
        self.predictors.get(&task).map(|p| p.as_ref())
    }

    /// Serve one prediction; always returns an envelope
    pub fn predict(&self, task: Task, request: &PredictionRequest) -> PredictionResult {
        let started = Instant::now();

        let result = match self.predictors.get(&task) {
            Some(predictor) => {
                match panic::catch_unwind(AssertUnwindSafe(|| predictor.predict(request))) {
                    Ok(result) => result,
                    Err(payload) => {
                        let message = payload
                            .downcast_ref::<&str>()
                            .map(|s| s.to_string())
                            .or_else(|| payload.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| "predictor panicked".to_string());
                        error!(task = %task, error = %message, "Predictor panicked");
                        ResultFormatter::new(task, self.clock.as_ref())
                            .failure(&PredictionError::inference(message))
                    }
                }
            }
            None => ResultFormatter::new(task, self.clock.as_ref())
                .failure(&PredictionError::ArtifactUnavailable(task)),
        };

        let elapsed = started.elapsed();
        self.metrics.observe_prediction(task, &result, elapsed);
        if let Some(logger) = &self.logger {
            logger.log_prediction(task, &result, elapsed);
        }
        result
    }

    /// Like [`predict`](Self::predict) for a task given by name
    pub fn predict_named(
        &self,
        task: &str,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, UnknownTask> {
        let task: Task = task.parse()?;
        Ok(self.predict(task, request))
    }
}
