//! Artifact decoders, tried in priority order
//!
//! 1. ONNX graph, optimized plan (tract)
//! 2. ONNX graph, typed but un-optimized plan, for graphs the optimizer rejects
//! 3. Portable JSON linear/logistic/softmax model

use super::artifact::{argmax, ArtifactMetadata, InferenceEngine, ModelKind, RawOutput};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Cursor;
use tract_onnx::prelude::*;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// What the loader already knows before decoding
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeHints {
    /// Width of the input row, when a feature list is available
    pub feature_count: Option<usize>,
    /// Kind declared by sidecar metadata
    pub kind: Option<ModelKind>,
}

/// A successfully decoded model
pub struct DecodedModel {
    pub kind: ModelKind,
    pub engine: Box<dyn InferenceEngine>,
    /// Metadata embedded in the artifact itself
    pub metadata: Option<ArtifactMetadata>,
}

/// One way of turning artifact bytes into a runnable model
pub trait DecoderStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn decode(&self, bytes: &[u8], hints: &DecodeHints) -> Result<DecodedModel>;
}

/// Decoder chain used by `ModelRegistry::load_all`
pub fn default_decoders() -> Vec<Box<dyn DecoderStrategy>> {
    vec![
        Box::new(OnnxDecoder::optimized()),
        Box::new(OnnxDecoder::typed()),
        Box::new(PortableDecoder),
    ]
}

/// ONNX decoder backed by tract
pub struct OnnxDecoder {
    optimize: bool,
}

impl OnnxDecoder {
    pub fn optimized() -> Self {
        Self { optimize: true }
    }

    pub fn typed() -> Self {
        Self { optimize: false }
    }
}

impl DecoderStrategy for OnnxDecoder {
    fn name(&self) -> &'static str {
        if self.optimize {
            "onnx-optimized"
        } else {
            "onnx-typed"
        }
    }

    fn decode(&self, bytes: &[u8], hints: &DecodeHints) -> Result<DecodedModel> {
        let mut model = tract_onnx::onnx()
            .model_for_read(&mut Cursor::new(bytes))
            .context("Failed to parse ONNX model")?;

        if let Some(width) = hints.feature_count {
            model = model
                .with_input_fact(0, f32::fact([1, width]).into())
                .context("Failed to set input shape")?;
        }

        let outputs = model.output_outlets()?.len();

        let typed = if self.optimize {
            model.into_optimized().context("Failed to optimize model")?
        } else {
            model.into_typed().context("Failed to type model")?
        };
        let plan = typed
            .into_runnable()
            .context("Failed to create runnable model")?;

        // sklearn-onnx classifiers emit (label, probabilities)
        let kind = hints.kind.unwrap_or(if outputs > 1 {
            ModelKind::ProbabilisticClassifier
        } else {
            ModelKind::Regressor
        });

        Ok(DecodedModel {
            kind,
            engine: Box::new(TractEngine { plan }),
            metadata: None,
        })
    }
}

/// Runs a tract plan on a `[1, n]` f32 row
pub struct TractEngine {
    plan: TractModel,
}

impl InferenceEngine for TractEngine {
    fn run(&self, features: &[f32]) -> Result<RawOutput> {
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, features.len()), features.to_vec())
            .context("Failed to shape input row")?
            .into();

        let outputs = self.plan.run(tvec!(input.into()))?;
        let first = outputs.first().context("No output from model")?;
        let values = tensor_values(first)?;
        let probabilities = match outputs.get(1) {
            Some(tensor) => Some(tensor_values(tensor)?),
            None => None,
        };

        Ok(RawOutput { values, probabilities })
    }

    fn backend(&self) -> &'static str {
        "tract"
    }
}

fn tensor_values(tensor: &Tensor) -> Result<Vec<f64>> {
    let cast = tensor.cast_to::<f64>()?;
    let view = cast.to_array_view::<f64>()?;
    Ok(view.iter().copied().collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LinearFamily {
    Linear,
    Logistic,
    Softmax,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Intercept {
    Single(f64),
    PerClass(Vec<f64>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Coefficients {
    Single(Vec<f64>),
    PerClass(Vec<Vec<f64>>),
}

#[derive(Deserialize)]
struct PortableModel {
    kind: LinearFamily,
    intercept: Intercept,
    coefficients: Coefficients,
    #[serde(default)]
    feature_names: Vec<String>,
    #[serde(default)]
    categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    classes: Vec<String>,
    #[serde(default)]
    version: Option<String>,
}

/// JSON-encoded linear models exported by the training notebooks
pub struct PortableDecoder;

impl DecoderStrategy for PortableDecoder {
    fn name(&self) -> &'static str {
        "portable-linear"
    }

    fn decode(&self, bytes: &[u8], hints: &DecodeHints) -> Result<DecodedModel> {
        let model: PortableModel =
            serde_json::from_slice(bytes).context("Failed to parse portable model")?;

        let weights = match model.coefficients {
            Coefficients::Single(row) => vec![row],
            Coefficients::PerClass(rows) => rows,
        };
        let intercepts = match model.intercept {
            Intercept::Single(b) => vec![b],
            Intercept::PerClass(bs) => bs,
        };

        let width = weights.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            anyhow::bail!("portable model has no coefficients");
        }
        if weights.iter().any(|row| row.len() != width) {
            anyhow::bail!("portable model rows have different widths");
        }
        if intercepts.len() != weights.len() {
            anyhow::bail!(
                "portable model has {} intercepts for {} coefficient rows",
                intercepts.len(),
                weights.len()
            );
        }
        match model.kind {
            LinearFamily::Softmax if weights.len() < 2 => {
                anyhow::bail!("softmax model needs at least two classes")
            }
            LinearFamily::Linear | LinearFamily::Logistic if weights.len() != 1 => {
                anyhow::bail!("{:?} model must have a single coefficient row", model.kind)
            }
            _ => {}
        }
        if !model.feature_names.is_empty() && model.feature_names.len() != width {
            anyhow::bail!(
                "portable model lists {} feature names for {} coefficients",
                model.feature_names.len(),
                width
            );
        }

        let natural = match model.kind {
            LinearFamily::Linear => ModelKind::Regressor,
            LinearFamily::Logistic | LinearFamily::Softmax => ModelKind::ProbabilisticClassifier,
        };

        Ok(DecodedModel {
            kind: hints.kind.unwrap_or(natural),
            engine: Box::new(LinearEngine {
                family: model.kind,
                intercepts,
                weights,
            }),
            metadata: Some(ArtifactMetadata {
                kind: None,
                feature_names: model.feature_names,
                categories: model.categories,
                classes: model.classes,
                version: model.version,
            }),
        })
    }
}

struct LinearEngine {
    family: LinearFamily,
    intercepts: Vec<f64>,
    weights: Vec<Vec<f64>>,
}

impl InferenceEngine for LinearEngine {
    fn run(&self, features: &[f32]) -> Result<RawOutput> {
        let expected = self.weights[0].len();
        if features.len() != expected {
            anyhow::bail!(
                "X has {} features, but model is expecting {} features as input",
                features.len(),
                expected
            );
        }

        let scores: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| {
                b + row
                    .iter()
                    .zip(features)
                    .map(|(w, x)| w * f64::from(*x))
                    .sum::<f64>()
            })
            .collect();

        let output = match self.family {
            LinearFamily::Linear => RawOutput {
                values: vec![scores[0]],
                probabilities: None,
            },
            LinearFamily::Logistic => {
                let z = scores[0];
                let p = 1.0 / (1.0 + (-z).exp());
                RawOutput {
                    values: vec![if z > 0.0 { 1.0 } else { 0.0 }],
                    probabilities: Some(vec![1.0 - p, p]),
                }
            }
            LinearFamily::Softmax => {
                let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
                let total: f64 = exps.iter().sum();
                let probabilities: Vec<f64> = exps.iter().map(|e| e / total).collect();
                RawOutput {
                    values: vec![argmax(&probabilities) as f64],
                    probabilities: Some(probabilities),
                }
            }
        };
        Ok(output)
    }

    fn backend(&self) -> &'static str {
        "linear"
    }
}
