//! Encoders for the classifiers that score a single job posting

use super::{EncodeContext, FeatureEncoder};
use crate::features::{
    count_skills, normalize_text, parse_skills, skill_flags, FeatureColumn, FeatureRow,
    FeatureSchema, TechnologyFlags, COUNTRIES, HEALTH_COUNTRIES,
};
use crate::models::PredictionRequest;
use crate::registry::Vocabulary;

/// Degree-mention classifier; the companion feature list may reorder these
#[derive(Debug, Clone, Copy, Default)]
pub struct DegreeEncoder;

const DEGREE_OPTIONAL_FIELDS: [&str; 3] = ["company_name", "job_country", "search_location"];

impl FeatureEncoder for DegreeEncoder {
    fn default_schema(&self, _vocabulary: &Vocabulary) -> FeatureSchema {
        let mut columns = vec![
            FeatureColumn::numeric("skill_count"),
            FeatureColumn::categorical("job_title_short"),
            FeatureColumn::categorical("job_via"),
        ];
        columns.extend(DEGREE_OPTIONAL_FIELDS.into_iter().map(FeatureColumn::categorical));
        FeatureSchema::new(columns)
    }

    fn encode(&self, request: &PredictionRequest, _ctx: &EncodeContext<'_>) -> FeatureRow {
        let mut row = FeatureRow::new();
        row.insert("skill_count", request.number("skill_count").unwrap_or(0.0));
        row.insert("job_title_short", request.text_or("job_title_short", ""));
        row.insert("job_via", request.text_or("job_via", ""));
        for field in DEGREE_OPTIONAL_FIELDS {
            row.insert(field, request.text_or(field, "Unknown"));
        }
        row
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HealthInsuranceEncoder;

impl FeatureEncoder for HealthInsuranceEncoder {
    fn default_schema(&self, _vocabulary: &Vocabulary) -> FeatureSchema {
        FeatureSchema::new(vec![
            FeatureColumn::categorical("job_title_short"),
            FeatureColumn::categorical("job_schedule_type"),
            FeatureColumn::flag("job_work_from_home"),
            FeatureColumn::categorical("job_country"),
            FeatureColumn::categorical("company_name"),
        ])
    }

    fn encode(&self, request: &PredictionRequest, _ctx: &EncodeContext<'_>) -> FeatureRow {
        // "Full Time" -> "full-time"
        let schedule = normalize_text(&request.text_or("job_schedule_type", ""))
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");

        let mut row = FeatureRow::new();
        row.insert("job_title_short", request.text_or("job_title_short", ""));
        row.insert("job_schedule_type", schedule);
        row.insert(
            "job_work_from_home",
            request.flag("job_work_from_home").unwrap_or(false),
        );
        row.insert(
            "job_country",
            HEALTH_COUNTRIES.remap(&request.text_or("job_country", "")),
        );
        row.insert("company_name", request.text_or("company_name", ""));
        row
    }
}

/// Ordinal code for small / medium / large
pub fn company_size_code(size: &str) -> Option<u32> {
    match normalize_text(size).as_str() {
        "small" => Some(0),
        "medium" => Some(1),
        "large" => Some(2),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BenefitsEncoder;

impl FeatureEncoder for BenefitsEncoder {
    fn default_schema(&self, _vocabulary: &Vocabulary) -> FeatureSchema {
        FeatureSchema::new(vec![
            FeatureColumn::categorical("job_title"),
            FeatureColumn::numeric("company_size"),
            FeatureColumn::categorical("location"),
        ])
    }

    fn encode(&self, request: &PredictionRequest, _ctx: &EncodeContext<'_>) -> FeatureRow {
        let location = request.text_or("location", "");
        let location = match COUNTRIES.lookup(&location) {
            Some(country) => country.to_string(),
            None => normalize_text(&location),
        };

        let mut row = FeatureRow::new();
        row.insert("job_title", request.text_or("job_title", ""));
        row.insert(
            "company_size",
            company_size_code(&request.text_or("company_size", "")).unwrap_or(0),
        );
        row.insert("location", location);
        row
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JobTitleEncoder;

impl FeatureEncoder for JobTitleEncoder {
    fn default_schema(&self, vocabulary: &Vocabulary) -> FeatureSchema {
        let mut columns: Vec<FeatureColumn> = vocabulary
            .skills
            .iter()
            .map(|skill| FeatureColumn::flag(format!("skill_{}", skill)))
            .collect();
        columns.extend(TechnologyFlags::COLUMNS.into_iter().map(FeatureColumn::flag));
        columns.push(FeatureColumn::numeric("n_skills"));
        columns.push(FeatureColumn::numeric("experience_years"));
        FeatureSchema::new(columns)
    }

    fn encode(&self, request: &PredictionRequest, ctx: &EncodeContext<'_>) -> FeatureRow {
        let skills_text = request.text_or("skills", "");
        let skills = parse_skills(&skills_text);

        let mut row = FeatureRow::new();
        for (skill, present) in skill_flags(&skills, &ctx.vocabulary.skills) {
            row.insert(format!("skill_{}", skill), present);
        }
        ctx.vocabulary
            .keyword_groups
            .classify(&skills_text)
            .insert_into(&mut row);
        row.insert("n_skills", count_skills(&skills_text));
        row.insert(
            "experience_years",
            request.number("experience_years").unwrap_or(0.0),
        );
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoders::test_support::{assert_row_matches_schema, context};
    use crate::features::FeatureValue;

    fn text(row: &FeatureRow, name: &str) -> String {
        match row.get(name) {
            Some(FeatureValue::Text(t)) => t.clone(),
            other => panic!("{} was {:?}", name, other),
        }
    }

    #[test]
    fn test_degree_defaults_optional_fields() {
        let vocabulary = Vocabulary::default();
        let request = PredictionRequest::new()
            .with("skill_count", "5")
            .with("job_title_short", "Data Analyst")
            .with("job_via", "via Indeed");
        let row = DegreeEncoder.encode(&request, &context(&vocabulary));

        assert_eq!(row.number("skill_count"), Some(5.0));
        assert_eq!(text(&row, "company_name"), "Unknown");
        assert_eq!(text(&row, "search_location"), "Unknown");
        assert_row_matches_schema(&row, &DegreeEncoder.default_schema(&vocabulary));
    }

    #[test]
    fn test_health_insurance_normalizes_schedule_and_country() {
        let vocabulary = Vocabulary::default();
        let request = PredictionRequest::new()
            .with("job_title_short", "Data Engineer")
            .with("job_schedule_type", "Full Time")
            .with("job_work_from_home", "Yes")
            .with("job_country", "United States")
            .with("company_name", "Acme");
        let row = HealthInsuranceEncoder.encode(&request, &context(&vocabulary));

        assert_eq!(text(&row, "job_schedule_type"), "full-time");
        assert_eq!(text(&row, "job_country"), "USA");
        assert_eq!(row.number("job_work_from_home"), Some(1.0));
        assert_row_matches_schema(&row, &HealthInsuranceEncoder.default_schema(&vocabulary));
    }

    #[test]
    fn test_benefits_location_and_size() {
        let vocabulary = Vocabulary::default();
        let request = PredictionRequest::new()
            .with("job_title", "Analyst")
            .with("company_size", "Large")
            .with("location", "uk");
        let row = BenefitsEncoder.encode(&request, &context(&vocabulary));
        assert_eq!(row.number("company_size"), Some(2.0));
        assert_eq!(text(&row, "location"), "United Kingdom");

        let row = BenefitsEncoder.encode(
            &request.with("location", " Remote, EU "),
            &context(&vocabulary),
        );
        assert_eq!(text(&row, "location"), "remote, eu");
    }

    #[test]
    fn test_company_size_code() {
        assert_eq!(company_size_code("small"), Some(0));
        assert_eq!(company_size_code(" MEDIUM "), Some(1));
        assert_eq!(company_size_code("huge"), None);
    }

    #[test]
    fn test_job_title_features() {
        let vocabulary = Vocabulary::default();
        let request = PredictionRequest::new()
            .with("skills", "Python, Tableau")
            .with("experience_years", 6);
        let row = JobTitleEncoder.encode(&request, &context(&vocabulary));

        assert_eq!(row.number("skill_python"), Some(1.0));
        assert_eq!(row.number("skill_tableau"), Some(1.0));
        assert_eq!(row.number("has_bi_tool"), Some(1.0));
        assert_eq!(row.number("n_skills"), Some(2.0));
        assert_eq!(row.number("experience_years"), Some(6.0));
        assert_row_matches_schema(&row, &JobTitleEncoder.default_schema(&vocabulary));
    }
}
