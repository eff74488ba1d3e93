use super::{EncodedRequest, Pipeline, Predictor, Scored};
use crate::encoders::{workforce_change, CompanyGrowthEncoder, RevenueGrowthEncoder};
use crate::error::PredictionError;
use crate::features::Clock;
use crate::models::{
    CompanyGrowthPrediction, GrowthClassification, Prediction, PredictionRequest,
    PredictionResult, RevenueGrowthPrediction, Task,
};
use crate::output::{as_percent, round_to};
use crate::registry::{ModelArtifact, ModelRegistry};
use std::sync::Arc;

/// Workforce decline beyond which the model's growth is capped
const DECLINE_THRESHOLD: f64 = -0.10;
const DECLINE_CAP_FACTOR: f64 = 50.0;

/// Undo the signed log1p applied to growth targets in training
pub fn inverse_growth_transform(raw: f64) -> f64 {
    raw.signum() * raw.abs().exp_m1()
}

/// Cap growth for companies that shrank by more than 10%
///
/// The model was trained on a target that rewards layoffs; until it is
/// retrained, growth is limited to `max(0, change * 50)` when the workforce
/// declined. Returns the growth and whether the cap lowered it.
pub fn apply_decline_cap(growth: f64, change: f64) -> (f64, bool) {
    if change < DECLINE_THRESHOLD {
        let cap = (change * DECLINE_CAP_FACTOR).max(0.0);
        if growth > cap {
            return (cap, true);
        }
    }
    (growth, false)
}

pub fn growth_category(growth_rate: f64) -> &'static str {
    if growth_rate < 0.0 {
        "Declining"
    } else if growth_rate < 5.0 {
        "Slow Growth"
    } else if growth_rate < 15.0 {
        "Moderate Growth"
    } else if growth_rate < 30.0 {
        "High Growth"
    } else {
        "Rapid Growth"
    }
}

pub struct CompanyGrowthPredictor {
    pipeline: Pipeline<CompanyGrowthEncoder>,
}

impl CompanyGrowthPredictor {
    pub fn new(registry: Arc<ModelRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pipeline: Pipeline::new(Task::CompanyGrowth, registry, CompanyGrowthEncoder, clock),
        }
    }
}

/// Display label for a growth class; named classes win over numeric codes
pub fn growth_class_label(label: &str) -> String {
    match label.trim().to_lowercase().as_str() {
        "high" | "high growth" | "1" => "High Growth".to_string(),
        "low" | "low growth" | "0" => "Low Growth".to_string(),
        _ => format!("Growth Class: {}", label),
    }
}

fn classify_growth(
    artifact: &ModelArtifact,
    encoded: &EncodedRequest,
) -> Result<Scored, PredictionError> {
    let classification = artifact.classify(&encoded.features.values)?;
    let prediction = growth_class_label(&classification.label);
    Ok(Scored::new(
        Prediction::GrowthClass(GrowthClassification {
            prediction,
            label_code: classification.label_code,
        }),
        classification.max_probability().map(as_percent),
    ))
}

fn regress_growth(
    artifact: &ModelArtifact,
    encoded: &EncodedRequest,
    request: &PredictionRequest,
) -> Result<Scored, PredictionError> {
    let raw = artifact.regress(&encoded.features.values)?;
    let change = workforce_change(
        request.number("workers").unwrap_or(0.0),
        request.number("previous_workers").unwrap_or(0.0),
    );
    let (growth, capped) = apply_decline_cap(inverse_growth_transform(raw), change);

    Ok(Scored::new(
        Prediction::CompanyGrowth(CompanyGrowthPrediction {
            growth_rate: round_to(growth, 2),
            growth_category: growth_category(growth).to_string(),
            raw_output: round_to(raw, 4),
            workforce_change_pct: round_to(change * 100.0, 2),
            decline_cap_applied: capped,
        }),
        None,
    ))
}

impl Predictor for CompanyGrowthPredictor {
    fn task(&self) -> Task {
        Task::CompanyGrowth
    }

    fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        self.pipeline.run(request, |artifact, encoded| {
            if artifact.kind().is_classifier() {
                classify_growth(artifact, encoded)
            } else {
                regress_growth(artifact, encoded, request)
            }
        })
    }
}

pub struct RevenueGrowthPredictor {
    pipeline: Pipeline<RevenueGrowthEncoder>,
}

impl RevenueGrowthPredictor {
    pub fn new(registry: Arc<ModelRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pipeline: Pipeline::new(Task::RevenueGrowth, registry, RevenueGrowthEncoder, clock),
        }
    }
}

impl Predictor for RevenueGrowthPredictor {
    fn task(&self) -> Task {
        Task::RevenueGrowth
    }

    fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        self.pipeline.run(request, |artifact, encoded| {
            let growth = artifact.regress(&encoded.features.values)?;
            let revenue = request.number("current_revenue").unwrap_or(0.0);
            let projected = revenue * (1.0 + growth / 100.0);

            Ok(Scored::new(
                Prediction::RevenueGrowth(RevenueGrowthPrediction {
                    growth_rate: round_to(growth, 2),
                    current_revenue: revenue,
                    projected_revenue: round_to(projected, 2),
                    revenue_increase: round_to(projected - revenue, 2),
                }),
                None,
            ))
        })
    }
}
