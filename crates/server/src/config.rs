//! Server configuration

use anyhow::Result;
use inference_lib::registry::DEFAULT_MAX_ARTIFACT_BYTES;
use inference_lib::RegistryConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    /// Name reported in structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// API server port for predictions, health and metrics
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding model artifacts and vocabularies
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Per-artifact size limit in MiB
    #[serde(default = "default_max_artifact_mb")]
    pub max_artifact_mb: u64,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_max_artifact_mb() -> u64 {
    DEFAULT_MAX_ARTIFACT_BYTES / (1024 * 1024)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            bind_addr: default_bind_addr(),
            port: default_port(),
            model_dir: default_model_dir(),
            max_artifact_mb: default_max_artifact_mb(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `jobpred` file and `JOBPRED_*` variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("jobpred").required(false))
            .add_source(config::Environment::with_prefix("JOBPRED").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            max_artifact_bytes: self.max_artifact_mb.saturating_mul(1024 * 1024),
            ..RegistryConfig::with_model_dir(&self.model_dir)
        }
    }
}
