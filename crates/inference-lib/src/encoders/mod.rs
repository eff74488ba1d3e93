//! Per-task feature encoders
//!
//! An encoder turns a validated [`PredictionRequest`] into a named
//! [`FeatureRow`] and declares the hard-coded column order used when an
//! artifact does not carry its own feature list.

mod campaign;
mod growth;
mod job_posting;
mod remote_work;
mod salary;

pub use campaign::CampaignEncoder;
pub use growth::{workforce_change, CompanyGrowthEncoder, RevenueGrowthEncoder};
pub use job_posting::{
    company_size_code, BenefitsEncoder, DegreeEncoder, HealthInsuranceEncoder, JobTitleEncoder,
};
pub use remote_work::{posting_text, RemoteWorkEncoder};
pub use salary::SalaryEncoder;

use crate::features::{FeatureRow, FeatureSchema};
use crate::models::{PredictionRequest, Task};
use crate::registry::{StandardScaler, Vocabulary};
use chrono::NaiveDateTime;

/// Everything an encoder may read besides the request itself
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    pub now: NaiveDateTime,
    pub vocabulary: &'a Vocabulary,
    pub scaler: Option<&'a StandardScaler>,
}

pub trait FeatureEncoder: Send + Sync {
    /// Column order used when the artifact has no feature list
    fn default_schema(&self, vocabulary: &Vocabulary) -> FeatureSchema;

    /// Build the named row. Never fails: unknown categories fall back to sentinels.
    fn encode(&self, request: &PredictionRequest, ctx: &EncodeContext<'_>) -> FeatureRow;
}

/// Encoder serving `task`
pub fn encoder_for(task: Task) -> Box<dyn FeatureEncoder> {
    match task {
        Task::Salary => Box::new(SalaryEncoder),
        Task::RemoteWork => Box::new(RemoteWorkEncoder),
        Task::DegreeMention => Box::new(DegreeEncoder),
        Task::HealthInsurance => Box::new(HealthInsuranceEncoder),
        Task::CampaignConversion => Box::new(CampaignEncoder),
        Task::CompanyGrowth => Box::new(CompanyGrowthEncoder),
        Task::RevenueGrowth => Box::new(RevenueGrowthEncoder),
        Task::Benefits => Box::new(BenefitsEncoder),
        Task::JobTitle => Box::new(JobTitleEncoder),
    }
}
