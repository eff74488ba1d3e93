use super::{Pipeline, Predictor, Scored};
use crate::encoders::{posting_text, RemoteWorkEncoder};
use crate::features::Clock;
use crate::models::{Prediction, PredictionRequest, PredictionResult, RemoteWorkPrediction, Task};
use crate::output::{as_percent, round_to};
use crate::registry::ModelRegistry;
use std::sync::Arc;

const REMOTE_KEYWORDS: &[&str] = &[
    "remote",
    "work from home",
    "wfh",
    "work from anywhere",
    "telecommute",
    "distributed team",
];
const ONSITE_KEYWORDS: &[&str] = &[
    "on-site",
    "onsite",
    "in-office",
    "in office",
    "in-person",
    "office-based",
    "office based",
];

const REMOTE_BONUS: f64 = 0.20;
const ONSITE_PENALTY: f64 = 0.25;
const MAX_SHIFT: f64 = 0.50;
const REMOTE_THRESHOLD: f64 = 0.5;

/// Keyword correction applied on top of the model's remote probability
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteAdjustment {
    pub probability: f64,
    pub adjustment: f64,
    pub matched_remote: Vec<String>,
    pub matched_onsite: Vec<String>,
}

impl RemoteAdjustment {
    /// Ties go to remote
    pub fn is_remote(&self) -> bool {
        self.probability >= REMOTE_THRESHOLD
    }
}

fn matches(text: &str, keywords: &[&str]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| text.contains(*k))
        .map(|k| k.to_string())
        .collect()
}

/// The remote model under-predicts postings that say "remote" outright;
/// each keyword shifts the probability, bounded per direction, then clamped
pub fn adjust_remote_probability(base: f64, text: &str) -> RemoteAdjustment {
    let text = text.to_lowercase();
    let matched_remote = matches(&text, REMOTE_KEYWORDS);
    let matched_onsite = matches(&text, ONSITE_KEYWORDS);

    let bonus = (REMOTE_BONUS * matched_remote.len() as f64).min(MAX_SHIFT);
    let penalty = (ONSITE_PENALTY * matched_onsite.len() as f64).min(MAX_SHIFT);
    let probability = (base + bonus - penalty).clamp(0.0, 1.0);

    RemoteAdjustment {
        probability,
        adjustment: bonus - penalty,
        matched_remote,
        matched_onsite,
    }
}

pub struct RemoteWorkPredictor {
    pipeline: Pipeline<RemoteWorkEncoder>,
}

impl RemoteWorkPredictor {
    pub fn new(registry: Arc<ModelRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pipeline: Pipeline::new(Task::RemoteWork, registry, RemoteWorkEncoder, clock),
        }
    }
}

impl Predictor for RemoteWorkPredictor {
    fn task(&self) -> Task {
        Task::RemoteWork
    }

    fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        self.pipeline.run(request, |artifact, encoded| {
            let classification = artifact.classify(&encoded.features.values)?;
            let base = classification
                .probability_of(1)
                .unwrap_or(if classification.label_code == 1 { 1.0 } else { 0.0 });

            let adjusted = adjust_remote_probability(base, &posting_text(request));
            let is_remote = adjusted.is_remote();
            let confidence = if is_remote {
                adjusted.probability
            } else {
                1.0 - adjusted.probability
            };

            Ok(Scored::new(
                Prediction::RemoteWork(RemoteWorkPrediction {
                    prediction: if is_remote { "Remote" } else { "On-site" }.to_string(),
                    is_remote,
                    probability_remote: round_to(adjusted.probability, 4),
                    base_probability: round_to(base, 4),
                    adjustment: round_to(adjusted.adjustment, 2),
                    matched_remote_keywords: adjusted.matched_remote,
                    matched_onsite_keywords: adjusted.matched_onsite,
                }),
                Some(as_percent(confidence)),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::test_support::{clock, Stub};
    use crate::registry::{ModelArtifact, ModelKind};

    #[test]
    fn test_single_remote_keyword_tips_to_remote() {
        let adjusted = adjust_remote_probability(0.30, "Remote Data Engineer");
        assert_eq!(adjusted.probability, 0.5);
        assert!(adjusted.is_remote());
        assert_eq!(adjusted.matched_remote, vec!["remote"]);
    }

    #[test]
    fn test_shifts_are_capped() {
        let adjusted = adjust_remote_probability(
            0.1,
            "remote, work from home, wfh, work from anywhere, telecommute",
        );
        assert_eq!(adjusted.adjustment, 0.5);
        assert!((adjusted.probability - 0.6).abs() < 1e-12);

        let adjusted = adjust_remote_probability(0.9, "onsite, in office, in-person");
        assert_eq!(adjusted.adjustment, -0.5);
        assert!((adjusted.probability - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_clamped_to_unit_interval() {
        assert_eq!(adjust_remote_probability(0.9, "remote wfh").probability, 1.0);
        assert_eq!(adjust_remote_probability(0.1, "on-site").probability, 0.0);
    }

    #[test]
    fn test_both_directions_apply_independently() {
        let adjusted = adjust_remote_probability(0.5, "remote role, in-office fridays");
        assert!((adjusted.adjustment - (0.20 - 0.25)).abs() < 1e-12);
        assert!(!adjusted.is_remote());
    }

    fn predictor(probabilities: Vec<f64>) -> RemoteWorkPredictor {
        let registry = ModelRegistry::builder()
            .with_artifact(ModelArtifact::new(
                "remote_work",
                ModelKind::ProbabilisticClassifier,
                Box::new(Stub::class(0.0, probabilities)),
            ))
            .build();
        RemoteWorkPredictor::new(Arc::new(registry), clock())
    }

    fn request(title: &str) -> PredictionRequest {
        PredictionRequest::new()
            .with("job_title_short", title)
            .with("job_seniority", "Senior")
            .with("job_country", "USA")
            .with("job_schedule_type", "Full-time")
    }

    #[test]
    fn test_predictor_applies_adjustment() {
        let result = predictor(vec![0.7, 0.3]).predict(&request("Remote Data Engineer"));
        match result.prediction {
            Some(Prediction::RemoteWork(remote)) => {
                assert_eq!(remote.prediction, "Remote");
                assert!(remote.is_remote);
                assert_eq!(remote.base_probability, 0.3);
                assert_eq!(remote.probability_remote, 0.5);
            }
            other => panic!("unexpected prediction {:?}", other),
        }
        assert_eq!(result.confidence, Some(50.0));
    }

    #[test]
    fn test_predictor_without_keywords() {
        let result = predictor(vec![0.7, 0.3]).predict(&request("Data Engineer"));
        match result.prediction {
            Some(Prediction::RemoteWork(remote)) => {
                assert_eq!(remote.prediction, "On-site");
                assert_eq!(remote.adjustment, 0.0);
            }
            other => panic!("unexpected prediction {:?}", other),
        }
        assert_eq!(result.confidence, Some(70.0));
    }

    #[test]
    fn test_predictor_reads_text_block() {
        let request = request("Data Engineer")
            .with("text_block", "Fully remote team, work from home anywhere");
        let result = predictor(vec![0.7, 0.3]).predict(&request);
        match result.prediction {
            Some(Prediction::RemoteWork(remote)) => {
                assert_eq!(remote.prediction, "Remote");
                assert_eq!(remote.adjustment, 0.4);
                assert_eq!(remote.matched_remote_keywords, vec!["remote", "work from home"]);
            }
            other => panic!("unexpected prediction {:?}", other),
        }
    }
}
