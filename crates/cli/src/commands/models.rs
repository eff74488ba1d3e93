//! Model listing and offline inspection commands

use anyhow::Result;
use inference_lib::encoders::encoder_for;
use inference_lib::registry::{LoadOutcome, LoadStatus};
use inference_lib::{ModelRegistry, RegistryConfig, Task};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_status, print_info, print_warning, short_digest, OutputFormat};

/// Row for the load report table
#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Model")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Decoder")]
    decoder: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Features")]
    features: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "SHA256")]
    checksum: String,
    #[tabled(rename = "Modified")]
    modified: String,
}

/// Row for the inspect table
#[derive(Debug, Serialize, Tabled)]
pub struct InspectRow {
    #[tabled(rename = "Task")]
    pub task: String,
    #[tabled(rename = "Loaded")]
    pub loaded: bool,
    #[tabled(rename = "Backend")]
    pub backend: String,
    #[tabled(rename = "Columns")]
    pub columns: usize,
    #[tabled(rename = "Column Source")]
    pub column_source: String,
    #[tabled(rename = "Classes")]
    pub classes: String,
    #[tabled(rename = "Encoders")]
    pub encoders: usize,
    #[tabled(rename = "Scaler")]
    pub scaler: bool,
}

fn dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

fn status_label(status: LoadStatus) -> &'static str {
    match status {
        LoadStatus::Loaded => "loaded",
        LoadStatus::Missing => "missing",
        LoadStatus::Failed => "failed",
    }
}

/// List the server's load report
pub async fn list_models(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let report = client.models().await?;
    render_report(&report, format)
}

/// Load `model_dir` in-process and list what happened
pub fn list_local_models(model_dir: &Path, format: OutputFormat) -> Result<()> {
    let registry = ModelRegistry::load_all(&RegistryConfig::with_model_dir(model_dir));
    render_report(registry.load_report(), format)
}

fn render_report(report: &[LoadOutcome], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            if report.is_empty() {
                print_warning("No models configured");
                return Ok(());
            }

            let rows: Vec<ModelRow> = report
                .iter()
                .map(|o| ModelRow {
                    name: o.name.clone(),
                    status: color_status(status_label(o.status)),
                    decoder: dash(o.decoder.clone()),
                    kind: dash(o.kind.map(|k| k.as_str().to_string())),
                    features: dash(o.feature_count.map(|n| n.to_string())),
                    version: dash(o.version.clone()),
                    checksum: dash(o.sha256.as_deref().map(short_digest)),
                    modified: dash(o.modified.map(|m| m.format("%Y-%m-%d %H:%M").to_string())),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            let loaded = report.iter().filter(|o| o.is_loaded()).count();
            println!("\nLoaded: {} of {} models", loaded, report.len());

            for outcome in report.iter().filter(|o| !o.is_loaded()) {
                if let Some(error) = &outcome.error {
                    print_warning(&format!("{}: {}", outcome.name, error));
                }
            }
        }
    }

    Ok(())
}

/// Per-task view of what each loaded model expects
pub fn inspect_rows(registry: &ModelRegistry) -> Vec<InspectRow> {
    Task::ALL
        .iter()
        .map(|&task| {
            let schema_len = encoder_for(task).default_schema(registry.vocabulary()).len();
            match registry.get(task.as_str()) {
                Some(artifact) => {
                    let (columns, column_source) = match artifact.feature_names() {
                        Some(names) => (names.len(), "artifact"),
                        None => (schema_len, "built-in"),
                    };
                    InspectRow {
                        task: task.as_str().to_string(),
                        loaded: true,
                        backend: artifact.backend().to_string(),
                        columns,
                        column_source: column_source.to_string(),
                        classes: if artifact.classes().is_empty() {
                            "-".to_string()
                        } else {
                            artifact.classes().join(", ")
                        },
                        encoders: artifact.encoders().len(),
                        scaler: artifact.scaler().is_some(),
                    }
                }
                None => InspectRow {
                    task: task.as_str().to_string(),
                    loaded: false,
                    backend: "-".to_string(),
                    columns: schema_len,
                    column_source: "built-in".to_string(),
                    classes: "-".to_string(),
                    encoders: 0,
                    scaler: false,
                },
            }
        })
        .collect()
}

/// Offline inspection of a model directory
pub fn inspect(model_dir: &Path, format: OutputFormat) -> Result<()> {
    let registry = ModelRegistry::load_all(&RegistryConfig::with_model_dir(model_dir));
    let rows = inspect_rows(&registry);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            print_info(&format!("Model directory: {}", model_dir.display()));
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!(
                "\nSkill vocabulary: {} entries",
                registry.vocabulary().skills.len()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_lib::registry::{InferenceEngine, ModelArtifact, ModelKind, RawOutput};

    struct Zero;

    impl InferenceEngine for Zero {
        fn run(&self, _features: &[f32]) -> anyhow::Result<RawOutput> {
            Ok(RawOutput::default())
        }

        fn backend(&self) -> &'static str {
            "zero"
        }
    }

    #[test]
    fn test_inspect_rows_cover_every_task() {
        let registry = ModelRegistry::builder()
            .with_artifact(
                ModelArtifact::new("benefits", ModelKind::Classifier, Box::new(Zero))
                    .with_feature_names(vec!["job_title".into(), "company_size".into()])
                    .with_classes(vec!["Dental".into(), "Vision".into()]),
            )
            .build();

        let rows = inspect_rows(&registry);
        assert_eq!(rows.len(), Task::ALL.len());

        let benefits = rows.iter().find(|r| r.task == "benefits").unwrap();
        assert!(benefits.loaded);
        assert_eq!(benefits.backend, "zero");
        assert_eq!(benefits.columns, 2);
        assert_eq!(benefits.column_source, "artifact");
        assert_eq!(benefits.classes, "Dental, Vision");

        let salary = rows.iter().find(|r| r.task == "salary").unwrap();
        assert!(!salary.loaded);
        assert_eq!(salary.column_source, "built-in");
        assert!(salary.columns > 0);
    }
}
