//! Loaded model artifacts and their companion data

use crate::error::PredictionError;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// What the model can be asked for, decided once at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Regressor,
    /// Label only, no class probabilities
    Classifier,
    ProbabilisticClassifier,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Regressor => "regressor",
            ModelKind::Classifier => "classifier",
            ModelKind::ProbabilisticClassifier => "probabilistic_classifier",
        }
    }

    pub fn is_classifier(&self) -> bool {
        !matches!(self, ModelKind::Regressor)
    }
}

/// Raw numbers produced by one engine call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOutput {
    /// Regression value or predicted class code
    pub values: Vec<f64>,
    /// Per-class probabilities, in class index order
    pub probabilities: Option<Vec<f64>>,
}

/// Executes a decoded model on a single feature row
pub trait InferenceEngine: Send + Sync {
    fn run(&self, features: &[f32]) -> Result<RawOutput>;

    /// Short name of the backend, for logs and the load report
    fn backend(&self) -> &'static str;
}

/// Training-time metadata shipped next to (or inside) an artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    #[serde(default)]
    pub kind: Option<ModelKind>,
    /// Expected input columns, in order
    #[serde(default)]
    pub feature_names: Vec<String>,
    /// Label-encoder classes per categorical column
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
    /// Class index to label
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl ArtifactMetadata {
    /// Overlay `other` on top of `self`, keeping our values where `other` is empty
    pub fn merge(mut self, other: ArtifactMetadata) -> Self {
        if other.kind.is_some() {
            self.kind = other.kind;
        }
        if !other.feature_names.is_empty() {
            self.feature_names = other.feature_names;
        }
        self.categories.extend(other.categories);
        if !other.classes.is_empty() {
            self.classes = other.classes;
        }
        if other.version.is_some() {
            self.version = other.version;
        }
        self
    }
}

/// Label encoder for one categorical column
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEncoder {
    classes: Vec<String>,
    neutral: usize,
}

impl CategoryEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        let neutral = classes
            .iter()
            .position(|c| c.eq_ignore_ascii_case("other") || c.eq_ignore_ascii_case("unknown"))
            .unwrap_or(0);
        Self { classes, neutral }
    }

    /// Encode a value; unseen values map to the neutral class
    pub fn encode(&self, value: &str) -> f32 {
        let index = self
            .classes
            .iter()
            .position(|c| c == value)
            .or_else(|| self.classes.iter().position(|c| c.eq_ignore_ascii_case(value.trim())))
            .unwrap_or(self.neutral);
        index as f32
    }

    pub fn neutral_code(&self) -> f32 {
        self.neutral as f32
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

pub type CategoryEncoders = HashMap<String, CategoryEncoder>;

/// Standardization companion: `(x - mean) / scale` per column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, column: &str, value: f64) -> Option<f64> {
        let index = self.columns.iter().position(|c| c == column)?;
        let mean = *self.mean.get(index)?;
        let scale = *self.scale.get(index)?;
        Some((value - mean) / scale)
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns.len() != self.mean.len() || self.columns.len() != self.scale.len() {
            anyhow::bail!(
                "scaler has {} columns but {} means and {} scales",
                self.columns.len(),
                self.mean.len(),
                self.scale.len()
            );
        }
        if let Some(pos) = self.scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            anyhow::bail!("scaler column {} has an unusable scale", self.columns[pos]);
        }
        Ok(())
    }
}

/// Outcome of a classifier call
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label_code: i64,
    pub label: String,
    pub probabilities: Option<Vec<f64>>,
}

impl Classification {
    pub fn max_probability(&self) -> Option<f64> {
        self.probabilities
            .as_ref()
            .and_then(|p| p.iter().copied().reduce(f64::max))
    }

    pub fn probability_of(&self, class_index: usize) -> Option<f64> {
        self.probabilities.as_ref().and_then(|p| p.get(class_index).copied())
    }
}

/// Where a loaded artifact came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSource {
    pub path: PathBuf,
    pub decoder: String,
    pub sha256: String,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// A decoded model plus its companions. Immutable once built.
pub struct ModelArtifact {
    name: String,
    kind: ModelKind,
    engine: Box<dyn InferenceEngine>,
    feature_names: Option<Vec<String>>,
    encoders: CategoryEncoders,
    classes: Vec<String>,
    scaler: Option<StandardScaler>,
    version: Option<String>,
    source: Option<ArtifactSource>,
}

impl std::fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("backend", &self.engine.backend())
            .field("features", &self.feature_names.as_ref().map(Vec::len))
            .field("version", &self.version)
            .finish()
    }
}

impl ModelArtifact {
    pub fn new(name: impl Into<String>, kind: ModelKind, engine: Box<dyn InferenceEngine>) -> Self {
        Self {
            name: name.into(),
            kind,
            engine,
            feature_names: None,
            encoders: HashMap::new(),
            classes: Vec::new(),
            scaler: None,
            version: None,
            source: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ArtifactMetadata) -> Self {
        if !metadata.feature_names.is_empty() {
            self.feature_names = Some(metadata.feature_names);
        }
        for (column, classes) in metadata.categories {
            self.encoders.insert(column, CategoryEncoder::new(classes));
        }
        if !metadata.classes.is_empty() {
            self.classes = metadata.classes;
        }
        if metadata.version.is_some() {
            self.version = metadata.version;
        }
        self
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    pub fn with_encoder(mut self, column: impl Into<String>, classes: Vec<String>) -> Self {
        self.encoders.insert(column.into(), CategoryEncoder::new(classes));
        self
    }

    pub fn with_classes(mut self, classes: Vec<String>) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_scaler(mut self, scaler: StandardScaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    pub fn with_source(mut self, source: ArtifactSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn backend(&self) -> &'static str {
        self.engine.backend()
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    pub fn encoders(&self) -> &CategoryEncoders {
        &self.encoders
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn source(&self) -> Option<&ArtifactSource> {
        self.source.as_ref()
    }

    /// Run a regressor and return its single output value
    pub fn regress(&self, features: &[f32]) -> Result<f64, PredictionError> {
        if self.kind != ModelKind::Regressor {
            return Err(PredictionError::inference(format!(
                "{} is a {}, not a regressor",
                self.name,
                self.kind.as_str()
            )));
        }
        let output = self.engine.run(features)?;
        output
            .values
            .first()
            .copied()
            .ok_or_else(|| PredictionError::inference("model returned no output"))
    }

    /// Run a classifier; probabilities are only requested from models that have them
    pub fn classify(&self, features: &[f32]) -> Result<Classification, PredictionError> {
        if !self.kind.is_classifier() {
            return Err(PredictionError::inference(format!(
                "{} is a regressor, not a classifier",
                self.name
            )));
        }
        let output = self.engine.run(features)?;

        let probabilities = match self.kind {
            ModelKind::ProbabilisticClassifier => output.probabilities.filter(|p| !p.is_empty()),
            _ => None,
        };

        let label_code = match (output.values.first(), &probabilities) {
            (Some(code), _) => code.round() as i64,
            (None, Some(probs)) => argmax(probs) as i64,
            (None, None) => return Err(PredictionError::inference("model returned no output")),
        };

        Ok(Classification {
            label_code,
            label: self.label_for(label_code),
            probabilities,
        })
    }

    /// Class label for a code, falling back to the code itself
    pub fn label_for(&self, code: i64) -> String {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.classes.get(i))
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    /// Index of the first class named like any of `names`, ignoring case
    pub fn class_index(&self, names: &[&str]) -> Option<usize> {
        self.classes
            .iter()
            .position(|class| names.iter().any(|n| class.trim().eq_ignore_ascii_case(n)))
    }
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, best_v), (i, v)| {
            if *v > best_v {
                (i, *v)
            } else {
                (best, best_v)
            }
        })
        .0
}
