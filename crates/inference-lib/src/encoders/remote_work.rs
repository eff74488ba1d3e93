use super::{EncodeContext, FeatureEncoder};
use crate::features::{
    FeatureColumn, FeatureRow, FeatureSchema, TemporalFeatures, COUNTRIES, REMOTE_SCHEDULES,
    REMOTE_SENIORITY, REMOTE_TITLES,
};
use crate::models::PredictionRequest;
use crate::registry::Vocabulary;

/// Free text describing the posting: title plus the optional text block
/// (`job_description` is accepted as an alias)
pub fn posting_text(request: &PredictionRequest) -> String {
    let title = request.text_or("job_title_short", "");
    match request
        .text("text_block")
        .or_else(|| request.text("job_description"))
    {
        Some(description) => format!("{} {}", title, description),
        None => title,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteWorkEncoder;

impl FeatureEncoder for RemoteWorkEncoder {
    fn default_schema(&self, _vocabulary: &Vocabulary) -> FeatureSchema {
        FeatureSchema::new(vec![
            FeatureColumn::categorical("job_title_short"),
            FeatureColumn::categorical("job_seniority"),
            FeatureColumn::categorical("job_country"),
            FeatureColumn::categorical("job_schedule_type"),
            FeatureColumn::categorical("job_via"),
            FeatureColumn::numeric("text_len"),
            FeatureColumn::numeric("text_word_count"),
            FeatureColumn::numeric("posted_month"),
            FeatureColumn::numeric("posted_dayofweek"),
        ])
    }

    fn encode(&self, request: &PredictionRequest, ctx: &EncodeContext<'_>) -> FeatureRow {
        let text = posting_text(request);
        let temporal = TemporalFeatures::at(ctx.now);

        let mut row = FeatureRow::new();
        row.insert(
            "job_title_short",
            REMOTE_TITLES.remap(&request.text_or("job_title_short", "")),
        );
        row.insert(
            "job_seniority",
            REMOTE_SENIORITY.remap(&request.text_or("job_seniority", "")),
        );
        row.insert("job_country", COUNTRIES.remap(&request.text_or("job_country", "")));
        row.insert(
            "job_schedule_type",
            REMOTE_SCHEDULES.remap(&request.text_or("job_schedule_type", "")),
        );
        row.insert("job_via", "linkedin");
        row.insert("text_len", text.chars().count());
        row.insert("text_word_count", text.split_whitespace().count());
        row.insert("posted_month", temporal.month);
        row.insert("posted_dayofweek", temporal.day_of_week);
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoders::test_support::{assert_row_matches_schema, context};
    use crate::features::FeatureValue;

    #[test]
    fn test_remaps_to_training_labels() {
        let vocabulary = Vocabulary::default();
        let request = PredictionRequest::new()
            .with("job_title_short", "ml engineer")
            .with("job_seniority", "Principal")
            .with("job_country", "US")
            .with("job_schedule_type", "full time");
        let row = RemoteWorkEncoder.encode(&request, &context(&vocabulary));

        let text = |name: &str| match row.get(name) {
            Some(FeatureValue::Text(t)) => t.clone(),
            other => panic!("{} was {:?}", name, other),
        };
        assert_eq!(text("job_title_short"), "Machine Learning Engineer");
        assert_eq!(text("job_seniority"), "Mid");
        assert_eq!(text("job_country"), "United States");
        assert_eq!(text("job_schedule_type"), "Full-time");
        assert_eq!(row.number("text_word_count"), Some(2.0));
        assert_eq!(row.number("posted_dayofweek"), Some(4.0));
        assert_row_matches_schema(&row, &RemoteWorkEncoder.default_schema(&vocabulary));
    }

    #[test]
    fn test_posting_text_includes_description() {
        let request = PredictionRequest::new()
            .with("job_title_short", "Data Engineer")
            .with("job_description", "Fully remote team");
        assert_eq!(posting_text(&request), "Data Engineer Fully remote team");
        assert_eq!(
            posting_text(&PredictionRequest::new().with("job_title_short", "Data Engineer")),
            "Data Engineer"
        );
    }

    #[test]
    fn test_posting_text_reads_text_block() {
        let vocabulary = Vocabulary::default();
        let request = PredictionRequest::new()
            .with("job_title_short", "Data Analyst")
            .with("text_block", "fully remote work from home")
            .with("job_description", "ignored");
        assert_eq!(
            posting_text(&request),
            "Data Analyst fully remote work from home"
        );

        let row = RemoteWorkEncoder.encode(&request, &context(&vocabulary));
        assert_eq!(row.number("text_word_count"), Some(7.0));
    }
}
