//! Result envelope formatting and display helpers

use crate::error::PredictionError;
use crate::features::Clock;
use crate::models::{Prediction, PredictionResult, Task};

/// Timestamp format of the envelope: local ISO-8601 with microseconds
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Wraps predictor output into [`PredictionResult`]
pub struct ResultFormatter<'a> {
    task: Task,
    clock: &'a dyn Clock,
}

impl<'a> ResultFormatter<'a> {
    pub fn new(task: Task, clock: &'a dyn Clock) -> Self {
        Self { task, clock }
    }

    pub fn success(&self, prediction: Prediction, confidence: Option<f64>) -> PredictionResult {
        PredictionResult {
            success: true,
            model_type: self.task.as_str().to_string(),
            prediction: Some(prediction),
            confidence,
            timestamp: self.timestamp(),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(&self, error: &PredictionError) -> PredictionResult {
        PredictionResult {
            success: false,
            model_type: self.task.as_str().to_string(),
            prediction: None,
            confidence: None,
            timestamp: self.timestamp(),
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }

    fn timestamp(&self) -> String {
        self.clock.now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// "$124,505"
pub fn format_usd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}", grouped)
}

/// Symmetric interval: ±1.96σ when σ is known, ±10% otherwise
pub fn confidence_interval(value: f64, std: Option<f64>) -> (f64, f64) {
    let margin = match std {
        Some(std) => 1.96 * std,
        None => value.abs() * 0.10,
    };
    (value - margin, value + margin)
}

pub fn experience_level(years: f64) -> &'static str {
    if years < 2.0 {
        "Entry Level"
    } else if years < 5.0 {
        "Mid Level"
    } else if years < 10.0 {
        "Senior Level"
    } else {
        "Expert Level"
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Probability (0-1) as a percentage rounded to one decimal
pub fn as_percent(probability: f64) -> f64 {
    round_to(probability * 100.0, 1)
}

/// "87.3%", or "N/A" without a probability
pub fn percent_label(probability: Option<f64>) -> String {
    match probability {
        Some(p) => format!("{:.1}%", p * 100.0),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FixedClock;
    use crate::models::{ErrorKind, GrowthClassification};
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_micro_opt(10, 30, 5, 42)
                .unwrap(),
        )
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(0), "$0");
        assert_eq!(format_usd(999), "$999");
        assert_eq!(format_usd(20000), "$20,000");
        assert_eq!(format_usd(124505), "$124,505");
        assert_eq!(format_usd(1234567), "$1,234,567");
    }

    #[test]
    fn test_confidence_interval() {
        assert_eq!(confidence_interval(100.0, None), (90.0, 110.0));
        let (low, high) = confidence_interval(100.0, Some(5.0));
        assert!((low - 90.2).abs() < 1e-9);
        assert!((high - 109.8).abs() < 1e-9);
    }

    #[test]
    fn test_experience_level_bands() {
        assert_eq!(experience_level(0.0), "Entry Level");
        assert_eq!(experience_level(2.0), "Mid Level");
        assert_eq!(experience_level(5.0), "Senior Level");
        assert_eq!(experience_level(10.0), "Expert Level");
    }

    #[test]
    fn test_percent_helpers() {
        assert_eq!(percent_label(Some(0.873)), "87.3%");
        assert_eq!(percent_label(None), "N/A");
        assert_eq!(as_percent(0.87349), 87.3);
        assert_eq!(round_to(11.732149, 4), 11.7321);
    }

    #[test]
    fn test_envelope_shapes() {
        let clock = clock();
        let formatter = ResultFormatter::new(Task::CompanyGrowth, &clock);

        let ok = formatter.success(
            Prediction::GrowthClass(GrowthClassification {
                prediction: "High Growth".to_string(),
                label_code: 1,
            }),
            Some(71.2),
        );
        assert!(ok.success);
        assert_eq!(ok.model_type, "company_growth");
        assert_eq!(ok.timestamp, "2024-03-15T10:30:05.000042");
        assert_eq!(ok.confidence, Some(71.2));

        let failed = formatter.failure(&PredictionError::ArtifactUnavailable(Task::CompanyGrowth));
        assert!(!failed.success);
        assert_eq!(
            failed.error.as_deref(),
            Some("Company growth prediction model is not available")
        );
        assert_eq!(failed.error_kind, Some(ErrorKind::ArtifactUnavailable));
        assert!(failed.prediction.is_none());
    }
}
