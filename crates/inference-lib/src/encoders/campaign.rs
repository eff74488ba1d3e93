use super::{EncodeContext, FeatureEncoder};
use crate::features::{
    one_hot, scale_numeric, FeatureColumn, FeatureRow, FeatureSchema, CAMPAIGN_DURATION_FALLBACK,
};
use crate::models::PredictionRequest;
use crate::registry::Vocabulary;

/// (request field, column prefix, training options)
const ONE_HOT_GROUPS: &[(&str, &str, &[&str])] = &[
    (
        "company",
        "Company",
        &[
            "Innovate Industries",
            "NexGen Systems",
            "Alpha Innovations",
            "DataTech Solutions",
            "TechCorp",
        ],
    ),
    (
        "campaign_type",
        "Campaign_Type",
        &["Email", "Influencer", "Search", "Social Media"],
    ),
    (
        "target_audience",
        "Target_Audience",
        &["All Ages", "Men 18-24", "Men 25-34", "Women 25-34", "Women 35-44"],
    ),
    (
        "channel_used",
        "Channel_Used",
        &["Email", "Facebook", "Google Ads", "Instagram", "Website", "YouTube"],
    ),
    (
        "location",
        "Location",
        &["Chicago", "Houston", "Los Angeles", "Miami", "New York"],
    ),
    (
        "language",
        "Language",
        &["English", "French", "Spanish", "Mandarin", "German"],
    ),
    (
        "customer_segment",
        "Customer_Segment",
        &[
            "Fashionistas",
            "Health & Wellness",
            "Outdoor Adventurers",
            "Foodies",
            "Tech Enthusiasts",
        ],
    ),
];

/// Scaled duration followed by one-hot campaign attributes
#[derive(Debug, Clone, Copy, Default)]
pub struct CampaignEncoder;

impl FeatureEncoder for CampaignEncoder {
    fn default_schema(&self, _vocabulary: &Vocabulary) -> FeatureSchema {
        let mut columns = vec![FeatureColumn::numeric("Duration")];
        for (_, prefix, options) in ONE_HOT_GROUPS {
            columns.extend(
                options
                    .iter()
                    .map(|option| FeatureColumn::flag(format!("{}_{}", prefix, option))),
            );
        }
        FeatureSchema::new(columns)
    }

    fn encode(&self, request: &PredictionRequest, ctx: &EncodeContext<'_>) -> FeatureRow {
        let duration = request.number("duration").unwrap_or(0.0);

        let mut row = FeatureRow::new();
        row.insert(
            "Duration",
            scale_numeric("Duration", duration, ctx.scaler, CAMPAIGN_DURATION_FALLBACK),
        );
        for (field, prefix, options) in ONE_HOT_GROUPS {
            let raw = request.text_or(field, "");
            let selected = options.iter().copied().find(|o| o.eq_ignore_ascii_case(&raw));
            one_hot(&mut row, prefix, options, selected);
        }
        row
    }
}
