//! Model registry
//!
//! Loads every configured artifact once, before any predictor exists, and
//! then only serves shared read-only handles. There is no interior
//! mutability: a registry is built whole by [`ModelRegistry::load_all`] or
//! [`RegistryBuilder`] and wrapped in an `Arc` afterwards.

mod artifact;
mod decoder;
mod vocabulary;

pub use artifact::{
    ArtifactMetadata, ArtifactSource, CategoryEncoder, CategoryEncoders, Classification,
    InferenceEngine, ModelArtifact, ModelKind, RawOutput, StandardScaler,
};
pub use decoder::{
    default_decoders, DecodeHints, DecodedModel, DecoderStrategy, OnnxDecoder, PortableDecoder,
    TractEngine,
};
pub use vocabulary::Vocabulary;

use crate::error::ArtifactError;
use crate::models::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use vocabulary::read_json;

/// Upper bound on a single artifact file (256 MiB)
pub const DEFAULT_MAX_ARTIFACT_BYTES: u64 = 256 * 1024 * 1024;

/// How one logical model name maps to files on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    pub name: String,
    /// Used when no candidate file matches
    pub default_file: String,
    /// Timestamped exports starting with this prefix are candidates; newest wins
    #[serde(default)]
    pub candidate_prefix: Option<String>,
    /// JSON array of expected feature names
    #[serde(default)]
    pub features_file: Option<String>,
    /// JSON `StandardScaler`
    #[serde(default)]
    pub scaler_file: Option<String>,
}

impl ArtifactSpec {
    pub fn new(name: impl Into<String>, default_file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_file: default_file.into(),
            candidate_prefix: None,
            features_file: None,
            scaler_file: None,
        }
    }

    pub fn with_candidates(mut self, prefix: impl Into<String>) -> Self {
        self.candidate_prefix = Some(prefix.into());
        self
    }

    pub fn with_features_file(mut self, file: impl Into<String>) -> Self {
        self.features_file = Some(file.into());
        self
    }

    pub fn with_scaler_file(mut self, file: impl Into<String>) -> Self {
        self.scaler_file = Some(file.into());
        self
    }

    fn is_companion(&self, file_name: &str) -> bool {
        self.features_file.as_deref() == Some(file_name)
            || self.scaler_file.as_deref() == Some(file_name)
    }
}

/// Logical name to file mapping for every served task
pub fn default_artifacts() -> Vec<ArtifactSpec> {
    vec![
        ArtifactSpec::new(Task::Salary.as_str(), "salary_regression_model.onnx")
            .with_candidates("salary_regression_model"),
        ArtifactSpec::new(Task::RemoteWork.as_str(), "remote_work_model.onnx"),
        ArtifactSpec::new(Task::DegreeMention.as_str(), "degree_mention_model.onnx")
            .with_features_file("degree_mention_features.json"),
        ArtifactSpec::new(Task::HealthInsurance.as_str(), "health_insurance_model.onnx"),
        ArtifactSpec::new(Task::CampaignConversion.as_str(), "campaign_conversion_model.onnx")
            .with_scaler_file("campaign_scaler.json"),
        ArtifactSpec::new(Task::CompanyGrowth.as_str(), "company_growth_model.onnx")
            .with_features_file("company_growth_features.json"),
        ArtifactSpec::new(Task::RevenueGrowth.as_str(), "revenue_growth_model.onnx"),
        ArtifactSpec::new(Task::Benefits.as_str(), "benefits_model.onnx"),
        ArtifactSpec::new(Task::JobTitle.as_str(), "job_title_model.onnx"),
    ]
}

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub model_dir: PathBuf,
    pub artifacts: Vec<ArtifactSpec>,
    pub skills_file: String,
    pub keyword_groups_file: String,
    pub max_artifact_bytes: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            artifacts: default_artifacts(),
            skills_file: "skills_vocabulary.json".to_string(),
            keyword_groups_file: "keyword_groups.json".to_string(),
            max_artifact_bytes: DEFAULT_MAX_ARTIFACT_BYTES,
        }
    }
}

impl RegistryConfig {
    pub fn with_model_dir(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Loaded,
    Missing,
    Failed,
}

/// What happened to one configured artifact during loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub name: String,
    pub status: LoadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ModelKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadOutcome {
    fn loaded(artifact: &ModelArtifact) -> Self {
        let source = artifact.source();
        Self {
            name: artifact.name().to_string(),
            status: LoadStatus::Loaded,
            path: source.map(|s| s.path.clone()),
            decoder: Some(
                source
                    .map(|s| s.decoder.clone())
                    .unwrap_or_else(|| artifact.backend().to_string()),
            ),
            kind: Some(artifact.kind()),
            feature_count: artifact.feature_names().map(<[String]>::len),
            sha256: source.map(|s| s.sha256.clone()),
            version: artifact.version().map(str::to_string),
            modified: source.and_then(|s| s.modified),
            error: None,
        }
    }

    fn unavailable(name: &str, err: &ArtifactError) -> Self {
        let status = match err {
            ArtifactError::NotFound { .. } => LoadStatus::Missing,
            _ => LoadStatus::Failed,
        };
        Self {
            name: name.to_string(),
            status,
            path: err.path().map(Path::to_path_buf),
            decoder: None,
            kind: None,
            feature_count: None,
            sha256: None,
            version: None,
            modified: None,
            error: Some(err.to_string()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status == LoadStatus::Loaded
    }
}

/// Read-only map of logical name to loaded artifact
#[derive(Debug)]
pub struct ModelRegistry {
    artifacts: HashMap<String, Arc<ModelArtifact>>,
    vocabulary: Vocabulary,
    report: Vec<LoadOutcome>,
}

impl ModelRegistry {
    /// Load every configured artifact with the default decoder chain
    pub fn load_all(config: &RegistryConfig) -> Self {
        Self::load_with(config, &default_decoders())
    }

    /// Load every configured artifact, trying `decoders` in order for each file
    ///
    /// Missing or undecodable files are logged and recorded in the load
    /// report; they never abort loading.
    pub fn load_with(config: &RegistryConfig, decoders: &[Box<dyn DecoderStrategy>]) -> Self {
        let mut artifacts = HashMap::new();
        let mut report = Vec::with_capacity(config.artifacts.len());

        for spec in &config.artifacts {
            match load_artifact(config, spec, decoders) {
                Ok(artifact) => {
                    report.push(LoadOutcome::loaded(&artifact));
                    artifacts.insert(spec.name.clone(), Arc::new(artifact));
                }
                Err(err @ ArtifactError::NotFound { .. }) => {
                    warn!(artifact = %spec.name, error = %err, "Artifact not found, predictions will be unavailable");
                    report.push(LoadOutcome::unavailable(&spec.name, &err));
                }
                Err(err) => {
                    error!(artifact = %spec.name, error = %err, "Failed to load artifact");
                    report.push(LoadOutcome::unavailable(&spec.name, &err));
                }
            }
        }

        let vocabulary = Vocabulary::load(
            &config.model_dir,
            &config.skills_file,
            &config.keyword_groups_file,
        );

        info!(
            model_dir = %config.model_dir.display(),
            loaded = artifacts.len(),
            configured = config.artifacts.len(),
            vocabulary_skills = vocabulary.skills.len(),
            "Model registry loaded"
        );

        Self {
            artifacts,
            vocabulary,
            report,
        }
    }

    /// Registry assembled from in-memory artifacts
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Pure lookup; absence means the feature is unavailable
    pub fn get(&self, name: &str) -> Option<Arc<ModelArtifact>> {
        self.artifacts.get(name).cloned()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.artifacts.contains_key(name)
    }

    /// Names of loaded artifacts, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.artifacts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn loaded_count(&self) -> usize {
        self.artifacts.len()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn load_report(&self) -> &[LoadOutcome] {
        &self.report
    }
}

/// Builder for registries whose artifacts are constructed in code
#[derive(Default)]
pub struct RegistryBuilder {
    artifacts: HashMap<String, Arc<ModelArtifact>>,
    vocabulary: Option<Vocabulary>,
    report: Vec<LoadOutcome>,
}

impl RegistryBuilder {
    pub fn with_artifact(mut self, artifact: ModelArtifact) -> Self {
        self.report.retain(|o| o.name != artifact.name());
        self.report.push(LoadOutcome::loaded(&artifact));
        self.artifacts
            .insert(artifact.name().to_string(), Arc::new(artifact));
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    pub fn build(self) -> ModelRegistry {
        ModelRegistry {
            artifacts: self.artifacts,
            vocabulary: self.vocabulary.unwrap_or_default(),
            report: self.report,
        }
    }
}

/// Newest candidate export for `spec`, else its default file, else nothing
pub fn resolve_artifact_path(dir: &Path, spec: &ArtifactSpec) -> Option<PathBuf> {
    if let Some(prefix) = &spec.candidate_prefix {
        if let Ok(entries) = fs::read_dir(dir) {
            let newest = entries
                .filter_map(Result::ok)
                .filter_map(|entry| {
                    let name = entry.file_name().into_string().ok()?;
                    let is_model_file = name.ends_with(".onnx")
                        || (name.ends_with(".json") && !name.ends_with(".meta.json"));
                    if !name.starts_with(prefix.as_str()) || !is_model_file || spec.is_companion(&name) {
                        return None;
                    }
                    let meta = entry.metadata().ok().filter(fs::Metadata::is_file)?;
                    Some((meta.modified().ok()?, name, entry.path()))
                })
                .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

            if let Some((_, name, path)) = newest {
                debug!(artifact = %spec.name, file = %name, "Selected most recent candidate");
                return Some(path);
            }
        }
    }

    let default = dir.join(&spec.default_file);
    default.is_file().then_some(default)
}

/// Sidecar metadata path: `model.onnx` -> `model.meta.json`
fn sidecar_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

fn load_companion<T: serde::de::DeserializeOwned>(
    path: &Path,
    artifact: &str,
    what: &str,
    expected: bool,
) -> Option<T> {
    match read_json::<T>(path) {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            if expected {
                warn!(artifact = %artifact, companion = %what, path = %path.display(), "Companion file missing, using built-in defaults");
            }
            None
        }
        Err(e) => {
            warn!(artifact = %artifact, companion = %what, error = %format!("{:#}", e), "Ignoring invalid companion file");
            None
        }
    }
}

fn load_artifact(
    config: &RegistryConfig,
    spec: &ArtifactSpec,
    decoders: &[Box<dyn DecoderStrategy>],
) -> Result<ModelArtifact, ArtifactError> {
    let dir = &config.model_dir;
    let path = resolve_artifact_path(dir, spec).ok_or_else(|| ArtifactError::NotFound {
        name: spec.name.clone(),
        dir: dir.clone(),
    })?;

    let file_meta = fs::metadata(&path).map_err(|source| ArtifactError::Io {
        path: path.clone(),
        source,
    })?;
    if file_meta.len() > config.max_artifact_bytes {
        return Err(ArtifactError::TooLarge {
            path,
            size: file_meta.len(),
            limit: config.max_artifact_bytes,
        });
    }
    let bytes = fs::read(&path).map_err(|source| ArtifactError::Io {
        path: path.clone(),
        source,
    })?;

    let sidecar: Option<ArtifactMetadata> =
        load_companion(&sidecar_path(&path), &spec.name, "metadata", false);
    let feature_list: Option<Vec<String>> = spec
        .features_file
        .as_ref()
        .and_then(|file| load_companion(&dir.join(file), &spec.name, "feature list", true));

    let hints = DecodeHints {
        feature_count: feature_list
            .as_ref()
            .map(Vec::len)
            .or_else(|| sidecar.as_ref().map(|m| m.feature_names.len()))
            .filter(|n| *n > 0),
        kind: sidecar.as_ref().and_then(|m| m.kind),
    };

    let mut attempts = Vec::new();
    let mut decoded = None;
    for decoder in decoders {
        match decoder.decode(&bytes, &hints) {
            Ok(model) => {
                info!(
                    artifact = %spec.name,
                    decoder = decoder.name(),
                    attempt = attempts.len() + 1,
                    kind = model.kind.as_str(),
                    "Artifact decoded"
                );
                decoded = Some((decoder.name(), model));
                break;
            }
            Err(e) => {
                debug!(artifact = %spec.name, decoder = decoder.name(), error = %format!("{:#}", e), "Decoder rejected artifact");
                attempts.push(format!("{}: {:#}", decoder.name(), e));
            }
        }
    }
    let (decoder_name, model) = decoded.ok_or_else(|| ArtifactError::Undecodable {
        path: path.clone(),
        attempts: attempts.join("; "),
    })?;

    let metadata = model
        .metadata
        .unwrap_or_default()
        .merge(sidecar.unwrap_or_default());
    let mut artifact =
        ModelArtifact::new(spec.name.clone(), model.kind, model.engine).with_metadata(metadata);
    if let Some(names) = feature_list {
        artifact = artifact.with_feature_names(names);
    }

    if let Some(file) = &spec.scaler_file {
        let scaler: Option<StandardScaler> =
            load_companion(&dir.join(file), &spec.name, "scaler", true);
        if let Some(scaler) = scaler {
            match scaler.validate() {
                Ok(()) => artifact = artifact.with_scaler(scaler),
                Err(e) => warn!(artifact = %spec.name, error = %e, "Ignoring inconsistent scaler, using manual fallback"),
            }
        }
    }

    let source = ArtifactSource {
        path,
        decoder: decoder_name.to_string(),
        sha256: compute_checksum(&bytes),
        size_bytes: file_meta.len(),
        modified: file_meta.modified().ok().map(DateTime::<Utc>::from),
    };
    Ok(artifact.with_source(source))
}

/// Compute SHA256 checksum of data
fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
