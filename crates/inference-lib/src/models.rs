//! Core data models for the prediction service

use crate::error::UnknownTask;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Prediction tasks served by this crate
///
/// The snake_case name doubles as the logical artifact name in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Salary,
    RemoteWork,
    DegreeMention,
    HealthInsurance,
    CampaignConversion,
    CompanyGrowth,
    RevenueGrowth,
    Benefits,
    JobTitle,
}

impl Task {
    pub const ALL: [Task; 9] = [
        Task::Salary,
        Task::RemoteWork,
        Task::DegreeMention,
        Task::HealthInsurance,
        Task::CampaignConversion,
        Task::CompanyGrowth,
        Task::RevenueGrowth,
        Task::Benefits,
        Task::JobTitle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Salary => "salary",
            Task::RemoteWork => "remote_work",
            Task::DegreeMention => "degree_mention",
            Task::HealthInsurance => "health_insurance",
            Task::CampaignConversion => "campaign_conversion",
            Task::CompanyGrowth => "company_growth",
            Task::RevenueGrowth => "revenue_growth",
            Task::Benefits => "benefits",
            Task::JobTitle => "job_title",
        }
    }

    /// Human-readable name used in user-facing messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Task::Salary => "Salary",
            Task::RemoteWork => "Remote work",
            Task::DegreeMention => "Degree requirement",
            Task::HealthInsurance => "Health insurance",
            Task::CampaignConversion => "Campaign conversion",
            Task::CompanyGrowth => "Company growth",
            Task::RevenueGrowth => "Revenue growth",
            Task::Benefits => "Benefits",
            Task::JobTitle => "Job title",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = UnknownTask;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Task::ALL
            .iter()
            .copied()
            .find(|task| task.as_str() == wanted)
            .ok_or_else(|| UnknownTask(s.to_string()))
    }
}

/// Raw value of a single request field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Trimmed, non-empty text form of the value
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }

    /// Numeric form; numeric strings are parsed and booleans map to 1/0
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Number(n) => n.is_finite().then_some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Boolean form accepting yes/no, true/false, on/off and 1/0
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Number(n) if *n == 1.0 => Some(true),
            FieldValue::Number(n) if *n == 0.0 => Some(false),
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => match s.trim().to_lowercase().as_str() {
                "yes" | "y" | "true" | "on" | "1" => Some(true),
                "no" | "n" | "false" | "off" | "0" => Some(false),
                _ => None,
            },
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// User-supplied fields for one prediction call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionRequest {
    fields: BTreeMap<String, FieldValue>,
}

impl PredictionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Present and not blank
    pub fn has(&self, field: &str) -> bool {
        self.fields.get(field).map(|v| !v.is_blank()).unwrap_or(false)
    }

    pub fn text(&self, field: &str) -> Option<String> {
        self.fields.get(field).and_then(FieldValue::as_text)
    }

    /// Text value or the given default when absent or blank
    pub fn text_or(&self, field: &str, default: &str) -> String {
        self.text(field).unwrap_or_else(|| default.to_string())
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(FieldValue::as_number)
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        self.fields.get(field).and_then(FieldValue::as_flag)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }
}

/// Category of failure carried by an unsuccessful result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    ArtifactUnavailable,
    Inference,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::ArtifactUnavailable => "artifact_unavailable",
            ErrorKind::Inference => "inference",
        }
    }
}

/// Uniform response envelope returned by every predictor
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub success: bool,
    pub model_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
    /// Percentage (0-100) when the model exposes class probabilities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl PredictionResult {
    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Task-specific payload of a successful prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Prediction {
    Salary(SalaryPrediction),
    RemoteWork(RemoteWorkPrediction),
    Degree(DegreePrediction),
    HealthInsurance(HealthInsurancePrediction),
    Campaign(CampaignClassification),
    ConversionRate(ConversionRateEstimate),
    CompanyGrowth(CompanyGrowthPrediction),
    GrowthClass(GrowthClassification),
    RevenueGrowth(RevenueGrowthPrediction),
    Benefits(BenefitsPrediction),
    JobTitle(JobTitlePrediction),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryRange {
    pub low: u64,
    pub high: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryPrediction {
    /// Formatted dollar figure, e.g. "$124,505"
    pub prediction: String,
    pub salary_value: u64,
    pub log_salary: f64,
    pub currency: String,
    pub job_title: String,
    pub num_skills: usize,
    pub features_count: usize,
    pub range: SalaryRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteWorkPrediction {
    /// "Remote" or "On-site"
    pub prediction: String,
    pub is_remote: bool,
    pub probability_remote: f64,
    pub base_probability: f64,
    pub adjustment: f64,
    pub matched_remote_keywords: Vec<String>,
    pub matched_onsite_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreePrediction {
    pub prediction: String,
    pub degree_mentioned: bool,
    /// "87.3%" or "N/A" when the model has no probabilities
    pub confidence: String,
    pub raw_prediction: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthInsurancePrediction {
    pub prediction: String,
    pub has_health_insurance: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_yes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignClassification {
    /// "High" or "Low"
    pub prediction: String,
    pub probability_high: f64,
    pub probability_low: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionRateEstimate {
    /// Percentage
    pub conversion_rate: f64,
    pub roi_category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_conversions: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_conversion: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyGrowthPrediction {
    /// Percentage after inverse transform and decline cap
    pub growth_rate: f64,
    pub growth_category: String,
    pub raw_output: f64,
    pub workforce_change_pct: f64,
    pub decline_cap_applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthClassification {
    pub prediction: String,
    pub label_code: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueGrowthPrediction {
    pub growth_rate: f64,
    pub current_revenue: f64,
    pub projected_revenue: f64,
    pub revenue_increase: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLabel {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenefitsPrediction {
    pub benefits: Vec<RankedLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobTitlePrediction {
    pub titles: Vec<RankedLabel>,
    pub experience_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_round_trips_through_name() {
        for task in Task::ALL {
            assert_eq!(task.as_str().parse::<Task>().unwrap(), task);
        }
        assert_eq!("remote-work".parse::<Task>().unwrap(), Task::RemoteWork);
        assert!("horoscope".parse::<Task>().is_err());
    }

    #[test]
    fn test_field_value_coercions() {
        assert_eq!(FieldValue::from("  42 ").as_number(), Some(42.0));
        assert_eq!(FieldValue::from("abc").as_number(), None);
        assert_eq!(FieldValue::from(3.0).as_text(), Some("3".to_string()));
        assert_eq!(FieldValue::from("Yes").as_flag(), Some(true));
        assert_eq!(FieldValue::from(0.0).as_flag(), Some(false));
        assert_eq!(FieldValue::from("maybe").as_flag(), None);
        assert_eq!(FieldValue::from("   ").as_text(), None);
    }

    #[test]
    fn test_request_deserializes_from_json_object() {
        let request: PredictionRequest = serde_json::from_str(
            r#"{"job_title_short": "Data Scientist", "skill_count": 4, "remote": true, "note": null}"#,
        )
        .unwrap();

        assert_eq!(request.text("job_title_short").as_deref(), Some("Data Scientist"));
        assert_eq!(request.number("skill_count"), Some(4.0));
        assert_eq!(request.flag("remote"), Some(true));
        assert!(!request.has("note"));
        assert!(!request.has("missing"));
    }

    #[test]
    fn test_failed_result_omits_prediction() {
        let result = PredictionResult {
            success: false,
            model_type: "salary".to_string(),
            prediction: None,
            confidence: None,
            timestamp: "2024-03-15T10:00:00.000000".to_string(),
            error: Some("Job title is required".to_string()),
            error_kind: Some(ErrorKind::Validation),
        };
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error_kind"], "validation");
        assert!(json.get("prediction").is_none());
    }
}
