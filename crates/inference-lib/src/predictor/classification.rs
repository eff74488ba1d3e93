//! Classifier-backed predictors over a single job posting

use super::{Pipeline, Predictor, Scored};
use crate::encoders::{BenefitsEncoder, DegreeEncoder, HealthInsuranceEncoder, JobTitleEncoder};
use crate::features::Clock;
use crate::models::{
    BenefitsPrediction, DegreePrediction, HealthInsurancePrediction, JobTitlePrediction,
    Prediction, PredictionRequest, PredictionResult, RankedLabel, Task,
};
use crate::output::{as_percent, experience_level, percent_label, round_to};
use crate::registry::{Classification, ModelArtifact, ModelRegistry};
use std::sync::Arc;

const BENEFIT_THRESHOLD: f64 = 0.5;
const MAX_TITLES: usize = 3;
const POSITIVE_CLASSES: [&str; 4] = ["1", "1.0", "true", "yes"];

/// Index of the positive class of a binary model; code 1 when classes are unnamed
fn positive_index(artifact: &ModelArtifact) -> usize {
    artifact.class_index(&POSITIVE_CLASSES).unwrap_or(1)
}

/// Class indices and labels ordered by descending probability
fn ranked(artifact: &ModelArtifact, probabilities: &[f64]) -> Vec<RankedLabel> {
    let mut indexed: Vec<(usize, f64)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    indexed
        .into_iter()
        .map(|(i, p)| RankedLabel {
            label: artifact.label_for(i as i64),
            probability: Some(round_to(p, 4)),
        })
        .collect()
}

fn predicted_only(classification: &Classification) -> Vec<RankedLabel> {
    vec![RankedLabel {
        label: classification.label.clone(),
        probability: None,
    }]
}

pub struct DegreePredictor {
    pipeline: Pipeline<DegreeEncoder>,
}

impl DegreePredictor {
    pub fn new(registry: Arc<ModelRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pipeline: Pipeline::new(Task::DegreeMention, registry, DegreeEncoder, clock),
        }
    }
}

impl Predictor for DegreePredictor {
    fn task(&self) -> Task {
        Task::DegreeMention
    }

    fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        self.pipeline.run(request, |artifact, encoded| {
            let classification = artifact.classify(&encoded.features.values)?;
            let degree_mentioned = classification.label_code == positive_index(artifact) as i64;
            let confidence = classification.max_probability();

            Ok(Scored::new(
                Prediction::Degree(DegreePrediction {
                    prediction: if degree_mentioned {
                        "Degree Required"
                    } else {
                        "No Degree Required"
                    }
                    .to_string(),
                    degree_mentioned,
                    confidence: percent_label(confidence),
                    raw_prediction: classification.label_code,
                }),
                confidence.map(as_percent),
            ))
        })
    }
}

pub struct HealthInsurancePredictor {
    pipeline: Pipeline<HealthInsuranceEncoder>,
}

impl HealthInsurancePredictor {
    pub fn new(registry: Arc<ModelRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pipeline: Pipeline::new(Task::HealthInsurance, registry, HealthInsuranceEncoder, clock),
        }
    }
}

impl Predictor for HealthInsurancePredictor {
    fn task(&self) -> Task {
        Task::HealthInsurance
    }

    fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        self.pipeline.run(request, |artifact, encoded| {
            let classification = artifact.classify(&encoded.features.values)?;
            let positive = positive_index(artifact);
            let has_health_insurance = classification.label_code == positive as i64;

            Ok(Scored::new(
                Prediction::HealthInsurance(HealthInsurancePrediction {
                    prediction: if has_health_insurance {
                        "Has health insurance"
                    } else {
                        "Don't have health insurance"
                    }
                    .to_string(),
                    has_health_insurance,
                    probability_yes: classification.probability_of(positive).map(|p| round_to(p, 4)),
                }),
                classification.max_probability().map(as_percent),
            ))
        })
    }
}

pub struct BenefitsPredictor {
    pipeline: Pipeline<BenefitsEncoder>,
}

impl BenefitsPredictor {
    pub fn new(registry: Arc<ModelRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pipeline: Pipeline::new(Task::Benefits, registry, BenefitsEncoder, clock),
        }
    }
}

impl Predictor for BenefitsPredictor {
    fn task(&self) -> Task {
        Task::Benefits
    }

    fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        self.pipeline.run(request, |artifact, encoded| {
            let classification = artifact.classify(&encoded.features.values)?;

            let benefits = match &classification.probabilities {
                Some(probabilities) => {
                    let all = ranked(artifact, probabilities);
                    let likely: Vec<RankedLabel> = all
                        .iter()
                        .filter(|l| l.probability.unwrap_or(0.0) >= BENEFIT_THRESHOLD)
                        .cloned()
                        .collect();
                    if likely.is_empty() {
                        all.into_iter().take(1).collect()
                    } else {
                        likely
                    }
                }
                None => predicted_only(&classification),
            };

            Ok(Scored::new(
                Prediction::Benefits(BenefitsPrediction { benefits }),
                classification.max_probability().map(as_percent),
            ))
        })
    }
}

pub struct JobTitlePredictor {
    pipeline: Pipeline<JobTitleEncoder>,
}

impl JobTitlePredictor {
    pub fn new(registry: Arc<ModelRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pipeline: Pipeline::new(Task::JobTitle, registry, JobTitleEncoder, clock),
        }
    }
}

impl Predictor for JobTitlePredictor {
    fn task(&self) -> Task {
        Task::JobTitle
    }

    fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        self.pipeline.run(request, |artifact, encoded| {
            let classification = artifact.classify(&encoded.features.values)?;
            let titles = match &classification.probabilities {
                Some(probabilities) => ranked(artifact, probabilities)
                    .into_iter()
                    .take(MAX_TITLES)
                    .collect(),
                None => predicted_only(&classification),
            };
            let years = request.number("experience_years").unwrap_or(0.0);

            Ok(Scored::new(
                Prediction::JobTitle(JobTitlePrediction {
                    titles,
                    experience_level: experience_level(years).to_string(),
                }),
                classification.max_probability().map(as_percent),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::test_support::{clock, Stub};
    use crate::registry::ModelKind;

    fn registry(artifact: ModelArtifact) -> Arc<ModelRegistry> {
        Arc::new(ModelRegistry::builder().with_artifact(artifact).build())
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn degree_request() -> PredictionRequest {
        PredictionRequest::new()
            .with("skill_count", 4)
            .with("job_title_short", "Data Analyst")
            .with("job_via", "via LinkedIn")
    }

    #[test]
    fn test_degree_with_probabilities() {
        let artifact = ModelArtifact::new(
            "degree_mention",
            ModelKind::ProbabilisticClassifier,
            Box::new(Stub::class(1.0, vec![0.127, 0.873])),
        );
        let result = DegreePredictor::new(registry(artifact), clock()).predict(&degree_request());
        match result.prediction {
            Some(Prediction::Degree(degree)) => {
                assert_eq!(degree.prediction, "Degree Required");
                assert!(degree.degree_mentioned);
                assert_eq!(degree.confidence, "87.3%");
                assert_eq!(degree.raw_prediction, 1);
            }
            other => panic!("unexpected prediction {:?}", other),
        }
        assert_eq!(result.confidence, Some(87.3));
    }

    #[test]
    fn test_degree_without_probabilities() {
        let artifact = ModelArtifact::new(
            "degree_mention",
            ModelKind::Classifier,
            Box::new(Stub::class(0.0, vec![0.9, 0.1])),
        );
        let result = DegreePredictor::new(registry(artifact), clock()).predict(&degree_request());
        match result.prediction {
            Some(Prediction::Degree(degree)) => {
                assert_eq!(degree.prediction, "No Degree Required");
                assert_eq!(degree.confidence, "N/A");
            }
            other => panic!("unexpected prediction {:?}", other),
        }
        assert!(result.confidence.is_none());
    }

    #[test]
    fn test_health_insurance() {
        let artifact = ModelArtifact::new(
            "health_insurance",
            ModelKind::ProbabilisticClassifier,
            Box::new(Stub::class(0.0, vec![0.6, 0.4])),
        );
        let request = PredictionRequest::new()
            .with("job_title_short", "Data Engineer")
            .with("job_schedule_type", "Full-time")
            .with("job_work_from_home", "No")
            .with("job_country", "USA")
            .with("company_name", "Acme");
        let result =
            HealthInsurancePredictor::new(registry(artifact), clock()).predict(&request);
        match result.prediction {
            Some(Prediction::HealthInsurance(health)) => {
                assert_eq!(health.prediction, "Don't have health insurance");
                assert_eq!(health.probability_yes, Some(0.4));
            }
            other => panic!("unexpected prediction {:?}", other),
        }
        assert_eq!(result.confidence, Some(60.0));
    }

    #[test]
    fn test_binary_classes_are_read_by_name() {
        let artifact = ModelArtifact::new(
            "degree_mention",
            ModelKind::Classifier,
            Box::new(Stub::value(0.0)),
        )
        .with_classes(strings(&["Yes", "No"]));
        let result = DegreePredictor::new(registry(artifact), clock()).predict(&degree_request());
        match result.prediction {
            Some(Prediction::Degree(degree)) => {
                assert_eq!(degree.prediction, "Degree Required");
                assert!(degree.degree_mentioned);
                assert_eq!(degree.raw_prediction, 0);
            }
            other => panic!("unexpected prediction {:?}", other),
        }

        let artifact = ModelArtifact::new(
            "health_insurance",
            ModelKind::ProbabilisticClassifier,
            Box::new(Stub::class(1.0, vec![0.3, 0.7])),
        )
        .with_classes(strings(&["True", "False"]));
        let request = PredictionRequest::new()
            .with("job_title_short", "Data Engineer")
            .with("job_schedule_type", "Full-time")
            .with("job_work_from_home", "No")
            .with("job_country", "USA")
            .with("company_name", "Acme");
        let result =
            HealthInsurancePredictor::new(registry(artifact), clock()).predict(&request);
        match result.prediction {
            Some(Prediction::HealthInsurance(health)) => {
                assert!(!health.has_health_insurance);
                assert_eq!(health.probability_yes, Some(0.3));
            }
            other => panic!("unexpected prediction {:?}", other),
        }
    }

    fn benefits_request() -> PredictionRequest {
        PredictionRequest::new()
            .with("job_title", "Data Analyst")
            .with("company_size", "medium")
            .with("location", "Canada")
    }

    #[test]
    fn test_benefits_threshold() {
        let artifact = ModelArtifact::new(
            "benefits",
            ModelKind::ProbabilisticClassifier,
            Box::new(Stub::class(2.0, vec![0.1, 0.55, 0.7])),
        )
        .with_classes(strings(&["401k", "Dental", "Health"]));
        let result = BenefitsPredictor::new(registry(artifact), clock()).predict(&benefits_request());
        match result.prediction {
            Some(Prediction::Benefits(benefits)) => {
                let labels: Vec<&str> = benefits.benefits.iter().map(|b| b.label.as_str()).collect();
                assert_eq!(labels, vec!["Health", "Dental"]);
            }
            other => panic!("unexpected prediction {:?}", other),
        }
    }

    #[test]
    fn test_benefits_falls_back_to_argmax() {
        let artifact = ModelArtifact::new(
            "benefits",
            ModelKind::ProbabilisticClassifier,
            Box::new(Stub::class(1.0, vec![0.2, 0.45, 0.35])),
        )
        .with_classes(strings(&["401k", "Dental", "Health"]));
        let result = BenefitsPredictor::new(registry(artifact), clock()).predict(&benefits_request());
        match result.prediction {
            Some(Prediction::Benefits(benefits)) => {
                assert_eq!(benefits.benefits.len(), 1);
                assert_eq!(benefits.benefits[0].label, "Dental");
                assert_eq!(benefits.benefits[0].probability, Some(0.45));
            }
            other => panic!("unexpected prediction {:?}", other),
        }
    }

    #[test]
    fn test_job_title_top_three() {
        let artifact = ModelArtifact::new(
            "job_title",
            ModelKind::ProbabilisticClassifier,
            Box::new(Stub::class(3.0, vec![0.05, 0.2, 0.15, 0.4, 0.2])),
        )
        .with_classes(strings(&[
            "Business Analyst",
            "Data Analyst",
            "Data Engineer",
            "Data Scientist",
            "ML Engineer",
        ]));
        let request = PredictionRequest::new()
            .with("skills", "python, sql, tensorflow")
            .with("experience_years", 6);
        let result = JobTitlePredictor::new(registry(artifact), clock()).predict(&request);
        match result.prediction {
            Some(Prediction::JobTitle(job)) => {
                let labels: Vec<&str> = job.titles.iter().map(|t| t.label.as_str()).collect();
                assert_eq!(labels, vec!["Data Scientist", "Data Analyst", "ML Engineer"]);
                assert_eq!(job.experience_level, "Senior Level");
            }
            other => panic!("unexpected prediction {:?}", other),
        }
        assert_eq!(result.confidence, Some(40.0));
    }

    #[test]
    fn test_engine_error_becomes_inference_failure() {
        let artifact = ModelArtifact::new(
            "job_title",
            ModelKind::Regressor,
            Box::new(Stub::value(1.0)),
        );
        let request = PredictionRequest::new()
            .with("skills", "python")
            .with("experience_years", 1);
        let result = JobTitlePredictor::new(registry(artifact), clock()).predict(&request);
        assert!(!result.success);
        assert!(result
            .error
            .as_deref()
            .unwrap_or_default()
            .starts_with("Prediction failed: "));
    }
}
