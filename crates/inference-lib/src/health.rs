//! Health check infrastructure for the prediction service
//!
//! Artifact availability is fixed at load time, so component health is
//! derived from the registry's load report on every call.

use crate::models::Task;
use crate::registry::{LoadStatus, ModelRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Still serving, but some predictions are unavailable
    Degraded,
    Unhealthy,
}

impl ComponentStatus {
    pub fn is_operational(&self) -> bool {
        matches!(self, ComponentStatus::Healthy | ComponentStatus::Degraded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    pub fn healthy() -> Self {
        Self {
            status: ComponentStatus::Healthy,
            message: None,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: ComponentStatus::Degraded,
            message: Some(message.into()),
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ComponentStatus::Unhealthy,
            message: Some(message.into()),
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status wins
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        let mut has_degraded = false;

        for health in components.values() {
            match health.status {
                ComponentStatus::Unhealthy => return ComponentStatus::Unhealthy,
                ComponentStatus::Degraded => has_degraded = true,
                ComponentStatus::Healthy => {}
            }
        }

        if has_degraded {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Healthy
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub const REGISTRY_COMPONENT: &str = "registry";

/// Health view over a loaded registry
#[derive(Debug)]
pub struct ServiceHealth {
    registry: Arc<ModelRegistry>,
    ready: AtomicBool,
}

impl ServiceHealth {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            ready: AtomicBool::new(false),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// One component per task plus the registry itself
    ///
    /// An unavailable task degrades the service; an empty registry makes it
    /// unhealthy.
    pub fn health(&self) -> HealthResponse {
        let report = self.registry.load_report();
        let mut components = HashMap::new();

        for task in Task::ALL {
            let name = task.as_str();
            let health = if self.registry.is_loaded(name) {
                ComponentHealth::healthy()
            } else {
                match report.iter().find(|o| o.name == name) {
                    Some(outcome) => {
                        let status = match outcome.status {
                            LoadStatus::Failed => "failed to load",
                            _ => "not found",
                        };
                        ComponentHealth::degraded(match &outcome.error {
                            Some(error) => format!("{}: {}", status, error),
                            None => status.to_string(),
                        })
                    }
                    None => ComponentHealth::degraded("not configured"),
                }
            };
            components.insert(name.to_string(), health);
        }

        let registry = if self.registry.loaded_count() == 0 {
            ComponentHealth::unhealthy("no model artifacts loaded")
        } else {
            ComponentHealth::healthy()
        };
        components.insert(REGISTRY_COMPONENT.to_string(), registry);

        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    pub fn readiness(&self) -> ReadinessResponse {
        if !self.ready.load(Ordering::SeqCst) {
            ReadinessResponse {
                ready: false,
                reason: Some("Service not yet initialized".to_string()),
            }
        } else if !self.health().status.is_operational() {
            ReadinessResponse {
                ready: false,
                reason: Some("No model artifacts loaded".to_string()),
            }
        } else {
            ReadinessResponse {
                ready: true,
                reason: None,
            }
        }
    }
}
