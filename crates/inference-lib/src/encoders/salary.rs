use super::{EncodeContext, FeatureEncoder};
use crate::features::{
    classify_title, count_skills, normalize_text, parse_skills, skill_flags, FeatureColumn,
    FeatureRow, FeatureSchema, Seniority, TechnologyFlags, TemporalFeatures, COUNTRIES,
};
use crate::models::PredictionRequest;
use crate::registry::Vocabulary;

/// Columns the salary exports always carry with a constant value
const JOB_VIA: &str = "linkedin";
const COMPANY_NAME_REDUCED: &str = "other";
const ROLE_FAMILY: &str = "data";
const SKILL_VALUE_MEAN: f64 = 0.5;
/// ln(10): a typical company posts about ten openings
const COMPANY_POSTING_LOG: f64 = std::f64::consts::LN_10;

/// Log-salary regressor features
#[derive(Debug, Clone, Copy, Default)]
pub struct SalaryEncoder;

impl FeatureEncoder for SalaryEncoder {
    fn default_schema(&self, vocabulary: &Vocabulary) -> FeatureSchema {
        let mut columns = vec![
            FeatureColumn::categorical("job_title_short"),
            FeatureColumn::numeric("job_title_short_len"),
            FeatureColumn::numeric("job_title_len"),
            FeatureColumn::categorical("us_state"),
            FeatureColumn::categorical("job_country"),
            FeatureColumn::categorical("job_schedule_type"),
            FeatureColumn::categorical("job_via"),
            FeatureColumn::flag("job_work_from_home"),
            FeatureColumn::flag("job_no_degree_mention"),
            FeatureColumn::flag("job_health_insurance"),
        ];
        columns.extend(
            vocabulary
                .skills
                .iter()
                .map(|skill| FeatureColumn::flag(format!("skill_{}", skill))),
        );
        columns.extend(
            ["posted_month", "posted_year", "posted_dayofweek", "posted_quarter"]
                .into_iter()
                .map(FeatureColumn::numeric),
        );
        columns.extend(Seniority::COLUMNS.into_iter().map(|c| match c {
            "exp_level" => FeatureColumn::numeric(c),
            _ => FeatureColumn::flag(c),
        }));
        columns.extend(TechnologyFlags::COLUMNS.into_iter().map(FeatureColumn::flag));
        columns.extend([
            FeatureColumn::numeric("n_skills"),
            FeatureColumn::numeric("n_skill_groups"),
            FeatureColumn::numeric("skill_value_mean"),
            FeatureColumn::categorical("company_name_reduced"),
            FeatureColumn::numeric("company_posting_log"),
            FeatureColumn::categorical("role_family"),
            FeatureColumn::flag("remote_x_senior"),
            FeatureColumn::flag("cloud_x_ds"),
        ]);
        FeatureSchema::new(columns)
    }

    fn encode(&self, request: &PredictionRequest, ctx: &EncodeContext<'_>) -> FeatureRow {
        let raw_title = request.text_or("job_title_short", "");
        let title = normalize_text(&raw_title);
        let country = COUNTRIES.remap(&request.text_or("job_country", "")).to_lowercase();
        let state = normalize_text(&request.text_or("job_state", "unknown"));
        let schedule = normalize_text(&request.text_or("job_schedule_type", "full_time"));
        let remote = request.flag("remote_option").unwrap_or(false);
        let skills_text = request.text_or("skills_text", "");

        let mut row = FeatureRow::new();
        row.insert("job_title_short", title.clone());
        row.insert("job_title_short_len", title.chars().count());
        row.insert("job_title_len", raw_title.chars().count());
        row.insert("us_state", state);
        row.insert("job_country", country);
        row.insert("job_schedule_type", schedule);
        row.insert("job_via", JOB_VIA);
        row.insert("job_work_from_home", remote);
        row.insert("job_no_degree_mention", 0.0);
        row.insert("job_health_insurance", 1.0);

        let skills = parse_skills(&skills_text);
        for (skill, present) in skill_flags(&skills, &ctx.vocabulary.skills) {
            row.insert(format!("skill_{}", skill), present);
        }

        TemporalFeatures::at(ctx.now).insert_into(&mut row);

        let seniority = classify_title(&title);
        seniority.insert_into(&mut row);
        let tech = ctx.vocabulary.keyword_groups.classify(&skills_text);
        tech.insert_into(&mut row);

        let is_data_scientist_or_analyst = title.contains("scientist") || title.contains("analyst");
        row.insert("n_skills", count_skills(&skills_text));
        row.insert("n_skill_groups", tech.count());
        row.insert("skill_value_mean", SKILL_VALUE_MEAN);
        row.insert("company_name_reduced", COMPANY_NAME_REDUCED);
        row.insert("company_posting_log", COMPANY_POSTING_LOG);
        row.insert("role_family", ROLE_FAMILY);
        row.insert("remote_x_senior", remote && seniority.is_senior);
        row.insert("cloud_x_ds", tech.has_cloud && is_data_scientist_or_analyst);
        row
    }
}
