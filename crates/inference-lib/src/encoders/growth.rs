//! Company-level encoders: workforce growth and revenue growth

use super::{EncodeContext, FeatureEncoder};
use crate::features::{
    one_hot, state_code, FeatureColumn, FeatureRow, FeatureSchema, INDUSTRIES, US_STATES,
};
use crate::models::PredictionRequest;
use crate::registry::Vocabulary;

fn industry_columns() -> impl Iterator<Item = FeatureColumn> {
    INDUSTRIES
        .canonical
        .iter()
        .map(|industry| FeatureColumn::flag(format!("industry_{}", industry)))
}

fn insert_industry(row: &mut FeatureRow, request: &PredictionRequest) {
    let industry = INDUSTRIES.lookup(&request.text_or("industry", ""));
    one_hot(row, "industry", INDUSTRIES.canonical, industry);
}

/// Workforce change between the two headcounts, as a fraction
pub fn workforce_change(workers: f64, previous_workers: f64) -> f64 {
    if previous_workers > 0.0 {
        (workers - previous_workers) / previous_workers
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyGrowthEncoder;

impl FeatureEncoder for CompanyGrowthEncoder {
    fn default_schema(&self, _vocabulary: &Vocabulary) -> FeatureSchema {
        let mut columns: Vec<FeatureColumn> =
            ["YearsOnList", "CompanyAge", "Workers", "PreviousWorkers", "HiringGrowth"]
                .into_iter()
                .map(FeatureColumn::numeric)
                .collect();
        columns.extend(industry_columns());
        columns.extend(
            US_STATES
                .iter()
                .map(|(code, _)| FeatureColumn::flag(format!("State_{}", code))),
        );
        FeatureSchema::new(columns)
    }

    fn encode(&self, request: &PredictionRequest, _ctx: &EncodeContext<'_>) -> FeatureRow {
        let workers = request.number("workers").unwrap_or(0.0);
        let previous = request.number("previous_workers").unwrap_or(0.0);

        let mut row = FeatureRow::new();
        row.insert("YearsOnList", request.number("years_on_list").unwrap_or(0.0));
        row.insert("CompanyAge", request.number("company_age").unwrap_or(0.0));
        row.insert("Workers", workers);
        row.insert("PreviousWorkers", previous);
        row.insert("HiringGrowth", workforce_change(workers, previous) * 100.0);
        insert_industry(&mut row, request);

        let codes: Vec<&str> = US_STATES.iter().map(|(code, _)| *code).collect();
        let state = state_code(&request.text_or("state", ""));
        one_hot(&mut row, "State", &codes, state);
        row
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RevenueGrowthEncoder;

impl FeatureEncoder for RevenueGrowthEncoder {
    fn default_schema(&self, _vocabulary: &Vocabulary) -> FeatureSchema {
        let mut columns = vec![
            FeatureColumn::numeric("current_revenue_log"),
            FeatureColumn::numeric("market_share"),
        ];
        columns.extend(industry_columns());
        FeatureSchema::new(columns)
    }

    fn encode(&self, request: &PredictionRequest, _ctx: &EncodeContext<'_>) -> FeatureRow {
        let revenue = request.number("current_revenue").unwrap_or(0.0).max(0.0);

        let mut row = FeatureRow::new();
        row.insert("current_revenue_log", revenue.ln_1p());
        row.insert("market_share", request.number("market_share").unwrap_or(0.0));
        insert_industry(&mut row, request);
        row
    }
}
