use super::{EncodedRequest, Pipeline, Predictor, Scored};
use crate::encoders::CampaignEncoder;
use crate::error::PredictionError;
use crate::features::Clock;
use crate::models::{
    CampaignClassification, ConversionRateEstimate, Prediction, PredictionRequest,
    PredictionResult, Task,
};
use crate::output::{as_percent, round_to};
use crate::registry::{ModelArtifact, ModelRegistry};
use std::sync::Arc;

/// ROI band for a conversion rate given in percent
pub fn roi_category(conversion_rate: f64) -> &'static str {
    if conversion_rate < 1.0 {
        "Poor"
    } else if conversion_rate < 3.0 {
        "Fair"
    } else if conversion_rate < 5.0 {
        "Good"
    } else if conversion_rate < 10.0 {
        "Excellent"
    } else {
        "Outstanding"
    }
}

/// High/Low classifier, or a conversion-rate regressor
pub struct CampaignPredictor {
    pipeline: Pipeline<CampaignEncoder>,
}

impl CampaignPredictor {
    pub fn new(registry: Arc<ModelRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pipeline: Pipeline::new(Task::CampaignConversion, registry, CampaignEncoder, clock),
        }
    }
}

fn classify(artifact: &ModelArtifact, encoded: &EncodedRequest) -> Result<Scored, PredictionError> {
    let classification = artifact.classify(&encoded.features.values)?;

    // Label encoders sort classes, which puts "High" first
    let high_index = artifact.class_index(&["high"]).unwrap_or(1);
    let is_high = classification.label_code == high_index as i64;
    let probability_high = classification
        .probability_of(high_index)
        .unwrap_or(if is_high { 1.0 } else { 0.0 });

    Ok(Scored::new(
        Prediction::Campaign(CampaignClassification {
            prediction: if is_high { "High" } else { "Low" }.to_string(),
            probability_high: round_to(probability_high, 4),
            probability_low: round_to(1.0 - probability_high, 4),
        }),
        classification.max_probability().map(as_percent),
    ))
}

/// Regressor path: the predicted rate is floored at zero before the
/// conversion figures and ROI band are derived from it
fn estimate_rate(
    artifact: &ModelArtifact,
    encoded: &EncodedRequest,
    request: &PredictionRequest,
) -> Result<Scored, PredictionError> {
    let rate = artifact.regress(&encoded.features.values)?.max(0.0);

    let expected_conversions = request
        .number("target_audience_size")
        .map(|audience| (audience * rate / 100.0).floor().max(0.0) as u64);
    let cost_per_conversion = match (request.number("budget"), expected_conversions) {
        (Some(_), Some(0)) => Some(0.0),
        (Some(budget), Some(conversions)) => Some(round_to(budget / conversions as f64, 2)),
        _ => None,
    };

    Ok(Scored::new(
        Prediction::ConversionRate(ConversionRateEstimate {
            conversion_rate: round_to(rate, 2),
            roi_category: roi_category(rate).to_string(),
            expected_conversions,
            cost_per_conversion,
        }),
        None,
    ))
}

impl Predictor for CampaignPredictor {
    fn task(&self) -> Task {
        Task::CampaignConversion
    }

    fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        self.pipeline.run(request, |artifact, encoded| {
            if artifact.kind().is_classifier() {
                classify(artifact, encoded)
            } else {
                estimate_rate(artifact, encoded, request)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::test_support::{clock, Stub};
    use crate::registry::ModelKind;

    fn request() -> PredictionRequest {
        PredictionRequest::new()
            .with("company", "TechCorp")
            .with("campaign_type", "Email")
            .with("target_audience", "Men 18-24")
            .with("duration", 30)
            .with("channel_used", "Email")
            .with("location", "Chicago")
            .with("language", "English")
            .with("customer_segment", "Foodies")
    }

    fn predictor(artifact: ModelArtifact) -> CampaignPredictor {
        let registry = ModelRegistry::builder().with_artifact(artifact).build();
        CampaignPredictor::new(Arc::new(registry), clock())
    }

    #[test]
    fn test_roi_bands() {
        assert_eq!(roi_category(0.5), "Poor");
        assert_eq!(roi_category(1.0), "Fair");
        assert_eq!(roi_category(3.0), "Good");
        assert_eq!(roi_category(5.0), "Excellent");
        assert_eq!(roi_category(10.0), "Outstanding");
    }

    #[test]
    fn test_classifier_with_sorted_labels() {
        let artifact = ModelArtifact::new(
            "campaign_conversion",
            ModelKind::ProbabilisticClassifier,
            Box::new(Stub::class(0.0, vec![0.8, 0.2])),
        )
        .with_classes(vec!["High".to_string(), "Low".to_string()]);

        let result = predictor(artifact).predict(&request());
        match result.prediction {
            Some(Prediction::Campaign(campaign)) => {
                assert_eq!(campaign.prediction, "High");
                assert_eq!(campaign.probability_high, 0.8);
                assert_eq!(campaign.probability_low, 0.2);
            }
            other => panic!("unexpected prediction {:?}", other),
        }
        assert_eq!(result.confidence, Some(80.0));
    }

    #[test]
    fn test_classifier_without_classes_uses_index_one() {
        let artifact = ModelArtifact::new(
            "campaign_conversion",
            ModelKind::Classifier,
            Box::new(Stub::value(0.0)),
        );
        let result = predictor(artifact).predict(&request());
        match result.prediction {
            Some(Prediction::Campaign(campaign)) => {
                assert_eq!(campaign.prediction, "Low");
                assert_eq!(campaign.probability_high, 0.0);
            }
            other => panic!("unexpected prediction {:?}", other),
        }
        assert!(result.confidence.is_none());
    }

    #[test]
    fn test_regressor_rate_path() {
        let artifact = ModelArtifact::new(
            "campaign_conversion",
            ModelKind::Regressor,
            Box::new(Stub::value(4.0)),
        );
        let result = predictor(artifact).predict(
            &request()
                .with("target_audience_size", 1000)
                .with("budget", 2000),
        );
        match result.prediction {
            Some(Prediction::ConversionRate(rate)) => {
                assert_eq!(rate.conversion_rate, 4.0);
                assert_eq!(rate.roi_category, "Good");
                assert_eq!(rate.expected_conversions, Some(40));
                assert_eq!(rate.cost_per_conversion, Some(50.0));
            }
            other => panic!("unexpected prediction {:?}", other),
        }
    }

    #[test]
    fn test_regressor_zero_conversions() {
        let artifact = ModelArtifact::new(
            "campaign_conversion",
            ModelKind::Regressor,
            Box::new(Stub::value(0.05)),
        );
        let result = predictor(artifact).predict(
            &request().with("target_audience_size", 10).with("budget", 500),
        );
        match result.prediction {
            Some(Prediction::ConversionRate(rate)) => {
                assert_eq!(rate.expected_conversions, Some(0));
                assert_eq!(rate.cost_per_conversion, Some(0.0));
                assert_eq!(rate.roi_category, "Poor");
            }
            other => panic!("unexpected prediction {:?}", other),
        }
    }

    #[test]
    fn test_negative_rate_is_floored() {
        let artifact = ModelArtifact::new(
            "campaign_conversion",
            ModelKind::Regressor,
            Box::new(Stub::value(-1.5)),
        );
        let result = predictor(artifact).predict(
            &request().with("target_audience_size", 1000).with("budget", 500),
        );
        match result.prediction {
            Some(Prediction::ConversionRate(rate)) => {
                assert_eq!(rate.conversion_rate, 0.0);
                assert_eq!(rate.expected_conversions, Some(0));
                assert_eq!(rate.roi_category, "Poor");
            }
            other => panic!("unexpected prediction {:?}", other),
        }
    }
}
