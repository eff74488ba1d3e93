//! Request validation, run before any encoding or model work

use crate::models::{PredictionRequest, Task};

/// What a rule checks about its field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check {
    /// Present and not blank
    Required,
    /// Parses as a number
    Numeric,
    AtLeast(f64),
    AtMost(f64),
    Between(f64, f64),
    /// yes/no, true/false or 1/0
    Flag,
    /// Case-insensitive membership
    OneOf(&'static [&'static str]),
}

/// One check on one field, with the message reported when it fails
///
/// Every check except `Required` is skipped when the field is absent, and
/// range checks are skipped when the value is not numeric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub field: &'static str,
    pub check: Check,
    pub message: &'static str,
}

const fn rule(field: &'static str, check: Check, message: &'static str) -> Rule {
    Rule { field, check, message }
}

const SALARY_RULES: &[Rule] = &[
    rule("job_title_short", Check::Required, "Job title is required"),
    rule("job_country", Check::Required, "Country is required"),
    rule("skills_text", Check::Required, "Skills are required"),
    rule("remote_option", Check::Flag, "Remote option must be yes or no"),
];

const REMOTE_WORK_RULES: &[Rule] = &[
    rule("job_title_short", Check::Required, "Job title is required"),
    rule("job_seniority", Check::Required, "Seniority is required"),
    rule("job_country", Check::Required, "Country is required"),
    rule("job_schedule_type", Check::Required, "Schedule type is required"),
];

const DEGREE_RULES: &[Rule] = &[
    rule("skill_count", Check::Required, "Skill Count is required"),
    rule("job_title_short", Check::Required, "Job Title Short is required"),
    rule("job_via", Check::Required, "Job Via is required"),
    rule("skill_count", Check::Numeric, "Skill count must be a number"),
    rule("skill_count", Check::AtLeast(0.0), "Skill count must be non-negative"),
];

const HEALTH_INSURANCE_RULES: &[Rule] = &[
    rule("job_title_short", Check::Required, "Job title is required"),
    rule("job_schedule_type", Check::Required, "Schedule type is required"),
    rule("job_work_from_home", Check::Required, "Work from home is required"),
    rule("job_work_from_home", Check::Flag, "Work from home must be Yes or No"),
    rule("job_country", Check::Required, "Country is required"),
    rule("company_name", Check::Required, "Company name is required"),
];

const CAMPAIGN_RULES: &[Rule] = &[
    rule("company", Check::Required, "Company is required"),
    rule("campaign_type", Check::Required, "Campaign type is required"),
    rule("target_audience", Check::Required, "Target audience is required"),
    rule("duration", Check::Required, "Duration is required"),
    rule("duration", Check::Numeric, "Duration must be a number"),
    rule("duration", Check::Between(1.0, 365.0), "Duration must be between 1 and 365 days"),
    rule("channel_used", Check::Required, "Channel is required"),
    rule("location", Check::Required, "Location is required"),
    rule("language", Check::Required, "Language is required"),
    rule("customer_segment", Check::Required, "Customer segment is required"),
    rule("budget", Check::Numeric, "Budget must be a number"),
    rule("budget", Check::AtLeast(0.0), "Budget must be non-negative"),
    rule("target_audience_size", Check::Numeric, "Target audience size must be a number"),
    rule("target_audience_size", Check::AtLeast(1.0), "Target audience size must be at least 1"),
];

const COMPANY_GROWTH_RULES: &[Rule] = &[
    rule("industry", Check::Required, "Industry is required"),
    rule("state", Check::Required, "State is required"),
    rule("workers", Check::Required, "Current workers is required"),
    rule("workers", Check::Numeric, "Current workers must be a number"),
    rule("workers", Check::AtLeast(1.0), "Current workers must be at least 1"),
    rule("previous_workers", Check::Required, "Previous workers is required"),
    rule("previous_workers", Check::Numeric, "Previous workers must be a number"),
    rule("previous_workers", Check::AtLeast(1.0), "Previous workers must be at least 1"),
    rule("years_on_list", Check::AtLeast(0.0), "Years on list must be non-negative"),
    rule("company_age", Check::AtLeast(0.0), "Company age must be non-negative"),
];

const REVENUE_GROWTH_RULES: &[Rule] = &[
    rule("company_name", Check::Required, "Company name is required"),
    rule("industry", Check::Required, "Industry is required"),
    rule("current_revenue", Check::Required, "Current revenue is required"),
    rule("current_revenue", Check::Numeric, "Current revenue must be a number"),
    rule("current_revenue", Check::AtLeast(0.0), "Current revenue must be non-negative"),
    rule("market_share", Check::Required, "Market share is required"),
    rule("market_share", Check::Numeric, "Market share must be a number"),
    rule("market_share", Check::Between(0.0, 100.0), "Market share must be between 0 and 100"),
];

pub const COMPANY_SIZES: &[&str] = &["small", "medium", "large"];

const BENEFITS_RULES: &[Rule] = &[
    rule("job_title", Check::Required, "Job title is required"),
    rule("company_size", Check::Required, "Company size is required"),
    rule("company_size", Check::OneOf(COMPANY_SIZES), "Company size must be one of: small, medium, large"),
    rule("location", Check::Required, "Location is required"),
];

const JOB_TITLE_RULES: &[Rule] = &[
    rule("skills", Check::Required, "Skills are required"),
    rule("experience_years", Check::Required, "Experience years is required"),
    rule("experience_years", Check::Numeric, "Experience years must be a number"),
    rule("experience_years", Check::AtLeast(0.0), "Experience years must be non-negative"),
    rule("experience_years", Check::AtMost(50.0), "Experience years seems unusually high"),
];

/// Rules for a task, in reporting order
pub fn rules_for(task: Task) -> &'static [Rule] {
    match task {
        Task::Salary => SALARY_RULES,
        Task::RemoteWork => REMOTE_WORK_RULES,
        Task::DegreeMention => DEGREE_RULES,
        Task::HealthInsurance => HEALTH_INSURANCE_RULES,
        Task::CampaignConversion => CAMPAIGN_RULES,
        Task::CompanyGrowth => COMPANY_GROWTH_RULES,
        Task::RevenueGrowth => REVENUE_GROWTH_RULES,
        Task::Benefits => BENEFITS_RULES,
        Task::JobTitle => JOB_TITLE_RULES,
    }
}

impl Rule {
    /// `true` when the request passes this rule
    pub fn passes(&self, request: &PredictionRequest) -> bool {
        if let Check::Required = self.check {
            return request.has(self.field);
        }
        if !request.has(self.field) {
            return true;
        }
        let number = request.number(self.field);
        match self.check {
            Check::Required => unreachable!("handled above"),
            Check::Numeric => number.is_some(),
            Check::AtLeast(min) => number.map_or(true, |n| n >= min),
            Check::AtMost(max) => number.map_or(true, |n| n <= max),
            Check::Between(min, max) => number.map_or(true, |n| n >= min && n <= max),
            Check::Flag => request.flag(self.field).is_some(),
            Check::OneOf(options) => request
                .text(self.field)
                .map_or(false, |v| options.iter().any(|o| o.eq_ignore_ascii_case(&v))),
        }
    }
}

/// Human-readable errors; empty means valid
pub fn validate(task: Task, request: &PredictionRequest) -> Vec<String> {
    rules_for(task)
        .iter()
        .filter(|rule| !rule.passes(request))
        .map(|rule| rule.message.to_string())
        .collect()
}
