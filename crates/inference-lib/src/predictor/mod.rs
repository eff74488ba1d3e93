//! Task predictors
//!
//! Every predictor runs the same sequence: validate the request, look the
//! artifact up, encode, assemble to the artifact's schema, run the model and
//! post-process. Failures at any step become an unsuccessful
//! [`PredictionResult`]; `predict` never returns an error or panics on bad
//! input.

mod campaign;
mod classification;
mod growth;
mod remote_work;
mod salary;
mod service;

pub use campaign::{roi_category, CampaignPredictor};
pub use classification::{
    BenefitsPredictor, DegreePredictor, HealthInsurancePredictor, JobTitlePredictor,
};
pub use growth::{
    apply_decline_cap, growth_category, inverse_growth_transform, CompanyGrowthPredictor,
    RevenueGrowthPredictor,
};
pub use remote_work::{adjust_remote_probability, RemoteAdjustment, RemoteWorkPredictor};
pub use salary::{salary_from_log, SalaryPredictor, MAX_SALARY, MIN_SALARY};
pub use service::PredictionService;

use crate::encoders::{EncodeContext, FeatureEncoder};
use crate::error::PredictionError;
use crate::features::{AssembledRow, Clock, FeatureRow, FeatureSchema};
use crate::models::{Prediction, PredictionRequest, PredictionResult, Task};
use crate::output::ResultFormatter;
use crate::registry::{ModelArtifact, ModelRegistry};
use crate::validation::validate;
use std::sync::Arc;
use tracing::debug;

pub trait Predictor: Send + Sync {
    fn task(&self) -> Task;

    fn predict(&self, request: &PredictionRequest) -> PredictionResult;
}

/// Post-processed model output
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub prediction: Prediction,
    /// Percentage
    pub confidence: Option<f64>,
}

impl Scored {
    pub fn new(prediction: Prediction, confidence: Option<f64>) -> Self {
        Self {
            prediction,
            confidence,
        }
    }
}

/// A request after encoding and schema assembly
#[derive(Debug, Clone)]
pub struct EncodedRequest {
    pub row: FeatureRow,
    pub features: AssembledRow,
}

/// Shared predict sequence for one task
pub(crate) struct Pipeline<E> {
    task: Task,
    registry: Arc<ModelRegistry>,
    encoder: E,
    clock: Arc<dyn Clock>,
}

impl<E: FeatureEncoder> Pipeline<E> {
    pub(crate) fn new(
        task: Task,
        registry: Arc<ModelRegistry>,
        encoder: E,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            task,
            registry,
            encoder,
            clock,
        }
    }

    pub(crate) fn run<F>(&self, request: &PredictionRequest, post: F) -> PredictionResult
    where
        F: FnOnce(&ModelArtifact, &EncodedRequest) -> Result<Scored, PredictionError>,
    {
        let formatter = ResultFormatter::new(self.task, self.clock.as_ref());
        match self.score(request, post) {
            Ok(scored) => formatter.success(scored.prediction, scored.confidence),
            Err(err) => formatter.failure(&err),
        }
    }

    fn score<F>(&self, request: &PredictionRequest, post: F) -> Result<Scored, PredictionError>
    where
        F: FnOnce(&ModelArtifact, &EncodedRequest) -> Result<Scored, PredictionError>,
    {
        let errors = validate(self.task, request);
        if !errors.is_empty() {
            return Err(PredictionError::Validation(errors));
        }

        let artifact = self
            .registry
            .get(self.task.as_str())
            .ok_or(PredictionError::ArtifactUnavailable(self.task))?;

        let vocabulary = self.registry.vocabulary();
        let ctx = EncodeContext {
            now: self.clock.now(),
            vocabulary,
            scaler: artifact.scaler(),
        };
        let row = self.encoder.encode(request, &ctx);

        let template = self.encoder.default_schema(vocabulary);
        let schema = match artifact.feature_names() {
            Some(names) => FeatureSchema::for_artifact(&template, names, artifact.encoders()),
            None => template,
        };
        let features = schema.assemble(&row, artifact.encoders())?;

        if !features.filled.is_empty() || !features.dropped.is_empty() {
            debug!(
                task = %self.task,
                filled = ?features.filled,
                dropped = ?features.dropped,
                "Feature row adjusted to artifact schema"
            );
        }

        post(&artifact, &EncodedRequest { row, features })
    }
}
