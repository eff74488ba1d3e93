use super::{Pipeline, Predictor, Scored};
use crate::encoders::SalaryEncoder;
use crate::features::Clock;
use crate::models::{Prediction, PredictionRequest, PredictionResult, SalaryPrediction, SalaryRange, Task};
use crate::output::{confidence_interval, format_usd, round_to};
use crate::registry::ModelRegistry;
use std::sync::Arc;

pub const MIN_SALARY: u64 = 20_000;
pub const MAX_SALARY: u64 = 500_000;

/// Dollar salary from the model's log-salary, clamped to the plausible band
pub fn salary_from_log(log_salary: f64) -> u64 {
    let salary = log_salary.exp().round();
    if salary.is_nan() {
        return MIN_SALARY;
    }
    salary.clamp(MIN_SALARY as f64, MAX_SALARY as f64) as u64
}

pub struct SalaryPredictor {
    pipeline: Pipeline<SalaryEncoder>,
}

impl SalaryPredictor {
    pub fn new(registry: Arc<ModelRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pipeline: Pipeline::new(Task::Salary, registry, SalaryEncoder, clock),
        }
    }
}

impl Predictor for SalaryPredictor {
    fn task(&self) -> Task {
        Task::Salary
    }

    fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        self.pipeline.run(request, |artifact, encoded| {
            let log_salary = artifact.regress(&encoded.features.values)?;
            let salary = salary_from_log(log_salary);
            let (low, high) = confidence_interval(salary as f64, None);

            Ok(Scored::new(
                Prediction::Salary(SalaryPrediction {
                    prediction: format_usd(salary),
                    salary_value: salary,
                    log_salary: round_to(log_salary, 4),
                    currency: "USD".to_string(),
                    job_title: request.text_or("job_title_short", ""),
                    num_skills: encoded.row.number("n_skills").unwrap_or(0.0) as usize,
                    features_count: encoded.features.values.len(),
                    range: SalaryRange {
                        low: low.round() as u64,
                        high: high.round() as u64,
                    },
                }),
                None,
            ))
        })
    }
}
