//! Feature extraction and assembly
//!
//! Encoders build a [`FeatureRow`] by name; [`FeatureSchema::assemble`] then
//! reorders it into the exact column order a model was trained on.

mod categorical;
mod scaling;
mod seniority;
mod skills;
mod technology;
mod temporal;

pub use categorical::{
    one_hot, state_code, CategoryMap, COUNTRIES, HEALTH_COUNTRIES, INDUSTRIES, REMOTE_SCHEDULES,
    REMOTE_SENIORITY, REMOTE_TITLES, US_STATES,
};
pub use scaling::{scale_numeric, AffineFallback, CAMPAIGN_DURATION_FALLBACK};
pub use seniority::{classify_title, Seniority};
pub use skills::{
    count_skills, normalize_skill, parse_skills, skill_flags, SkillSet, DEFAULT_SKILLS,
};
pub use technology::{KeywordGroups, TechnologyFlags};
pub use temporal::{Clock, FixedClock, SystemClock, TemporalFeatures};

use crate::error::PredictionError;
use crate::registry::CategoryEncoders;
use std::collections::HashSet;

/// Lower-case and trim a free-text field
pub fn normalize_text(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A single cell before encoding
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<usize> for FeatureValue {
    fn from(value: usize) -> Self {
        FeatureValue::Number(value as f64)
    }
}

impl From<u32> for FeatureValue {
    fn from(value: u32) -> Self {
        FeatureValue::Number(f64::from(value))
    }
}

impl From<i32> for FeatureValue {
    fn from(value: i32) -> Self {
        FeatureValue::Number(f64::from(value))
    }
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Number(if value { 1.0 } else { 0.0 })
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

/// Named cells in insertion order; re-inserting a name replaces its value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow {
    cells: Vec<(String, FeatureValue)>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        let name = name.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(n, _)| *n == name) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.cells.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(_) => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Numeric,
    Categorical,
    OneHotFlag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureColumn {
    pub name: String,
    pub kind: FeatureKind,
}

impl FeatureColumn {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: FeatureKind::Numeric }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: FeatureKind::Categorical }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: FeatureKind::OneHotFlag }
    }
}

/// Ordered columns a model expects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<FeatureColumn>,
}

/// Schema-conformant row ready for the engine
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRow {
    pub values: Vec<f32>,
    /// Schema columns the encoder did not produce
    pub filled: Vec<String>,
    /// Encoder columns the schema does not know
    pub dropped: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<FeatureColumn>) -> Self {
        Self { columns }
    }

    /// Schema from an artifact's feature list, taking kinds from `template`
    ///
    /// Names unknown to the template are categorical when the artifact has
    /// a label encoder for them and numeric otherwise.
    pub fn for_artifact(
        template: &FeatureSchema,
        names: &[String],
        encoders: &CategoryEncoders,
    ) -> Self {
        let columns = names
            .iter()
            .map(|name| {
                let kind = template.kind_of(name).unwrap_or(if encoders.contains_key(name) {
                    FeatureKind::Categorical
                } else {
                    FeatureKind::Numeric
                });
                FeatureColumn { name: name.clone(), kind }
            })
            .collect();
        Self { columns }
    }

    pub fn kind_of(&self, name: &str) -> Option<FeatureKind> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.kind)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Reorder, pad and truncate `row` to this schema
    ///
    /// Missing numeric and flag columns become 0, missing categorical columns
    /// take the encoder's neutral code. Text in a numeric column must parse.
    pub fn assemble(
        &self,
        row: &FeatureRow,
        encoders: &CategoryEncoders,
    ) -> Result<AssembledRow, PredictionError> {
        let mut values = Vec::with_capacity(self.columns.len());
        let mut filled = Vec::new();

        for column in &self.columns {
            let encoder = encoders.get(&column.name);
            let value = match (row.get(&column.name), column.kind) {
                (None, FeatureKind::Categorical) => {
                    filled.push(column.name.clone());
                    encoder.map(|e| e.neutral_code()).unwrap_or(0.0)
                }
                (None, _) => {
                    filled.push(column.name.clone());
                    0.0
                }
                (Some(FeatureValue::Number(n)), _) => *n as f32,
                (Some(FeatureValue::Text(text)), FeatureKind::Categorical) => {
                    encoder.map(|e| e.encode(text)).unwrap_or(0.0)
                }
                (Some(FeatureValue::Text(text)), _) => match text.trim().parse::<f32>() {
                    Ok(n) => n,
                    Err(_) => {
                        return Err(PredictionError::inference(format!(
                            "could not convert string to float: '{}' (column {})",
                            text, column.name
                        )))
                    }
                },
            };
            values.push(value);
        }

        let known: HashSet<&str> = self.names().collect();
        let dropped = row
            .names()
            .filter(|name| !known.contains(name))
            .map(str::to_string)
            .collect();

        Ok(AssembledRow { values, filled, dropped })
    }
}
