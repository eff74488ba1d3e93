//! Inference library for the job board prediction forms
//!
//! This crate provides the core functionality for:
//! - Loading model artifacts and their companion files
//! - Rebuilding the feature vector each model was trained on
//! - Per-task predictors with their post-processing rules
//! - Request validation and result formatting
//! - Health checks and observability

pub mod encoders;
pub mod error;
pub mod features;
pub mod health;
pub mod models;
pub mod observability;
pub mod output;
pub mod predictor;
pub mod registry;
pub mod validation;

pub use error::{ArtifactError, PredictionError, UnknownTask};
pub use health::{ComponentHealth, ComponentStatus, HealthResponse, ReadinessResponse, ServiceHealth};
pub use models::*;
pub use observability::{PredictionMetrics, StructuredLogger};
pub use predictor::{PredictionService, Predictor};
pub use registry::{ModelRegistry, RegistryConfig};
