//! Error taxonomy for artifact loading and prediction

use crate::models::{ErrorKind, Task};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures a predictor recovers from and reports in its result envelope
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("{} prediction model is not available", .0.display_name())]
    ArtifactUnavailable(Task),

    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Prediction failed: {0}")]
    Inference(String),
}

impl PredictionError {
    pub fn inference(message: impl Into<String>) -> Self {
        PredictionError::Inference(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictionError::ArtifactUnavailable(_) => ErrorKind::ArtifactUnavailable,
            PredictionError::Validation(_) => ErrorKind::Validation,
            PredictionError::Inference(_) => ErrorKind::Inference,
        }
    }
}

impl From<anyhow::Error> for PredictionError {
    fn from(err: anyhow::Error) -> Self {
        PredictionError::Inference(format!("{:#}", err))
    }
}

/// Load-phase failures for a single artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("no artifact file found for {name} in {}", .dir.display())]
    NotFound { name: String, dir: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is {size} bytes, above the {limit} byte limit", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("no decoder accepted {}: {attempts}", .path.display())]
    Undecodable { path: PathBuf, attempts: String },
}

impl ArtifactError {
    /// File the failure refers to, if one was resolved
    pub fn path(&self) -> Option<&Path> {
        match self {
            ArtifactError::NotFound { .. } => None,
            ArtifactError::Io { path, .. }
            | ArtifactError::TooLarge { path, .. }
            | ArtifactError::Undecodable { path, .. } => Some(path),
        }
    }
}

/// Task name that does not match any served prediction task
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown prediction task: {0}")]
pub struct UnknownTask(pub String);
