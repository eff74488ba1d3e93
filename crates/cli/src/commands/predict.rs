//! Prediction commands, remote or against a local model directory

use anyhow::{Context, Result};
use colored::Colorize;
use inference_lib::{ModelRegistry, PredictionRequest, PredictionService, RegistryConfig, Task};
use std::path::Path;
use std::sync::Arc;
use tabled::Tabled;

use crate::client::{ApiClient, PredictionEnvelope};
use crate::output::{color_confidence, display_value, print_error, print_success, OutputFormat};

/// Row for the prediction table
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Split `key=value`; the value keeps any further `=` signs
pub fn parse_field(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Field '{}' must be written as key=value", raw))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Field '{}' has an empty name", raw);
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Form-style request: every value is submitted as text
pub fn build_request(fields: &[String]) -> Result<PredictionRequest> {
    let mut request = PredictionRequest::new();
    for raw in fields {
        let (key, value) = parse_field(raw)?;
        request.insert(key, value);
    }
    Ok(request)
}

/// Predict through the server; returns whether the prediction succeeded
pub async fn predict_remote(
    client: &ApiClient,
    task: Task,
    request: &PredictionRequest,
    format: OutputFormat,
) -> Result<bool> {
    let envelope = client.predict(task, request).await?;
    render(task, &envelope, format)
}

/// Predict in-process from `model_dir`; returns whether the prediction succeeded
pub fn predict_local(
    model_dir: &Path,
    task: Task,
    request: &PredictionRequest,
    format: OutputFormat,
) -> Result<bool> {
    let registry = ModelRegistry::load_all(&RegistryConfig::with_model_dir(model_dir));
    let service = PredictionService::new(Arc::new(registry));
    let result = service.predict(task, request);

    let envelope: PredictionEnvelope =
        serde_json::from_value(serde_json::to_value(&result)?).context("Failed to read result")?;
    render(task, &envelope, format)
}

fn render(task: Task, envelope: &PredictionEnvelope, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(envelope)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            if !envelope.success {
                let message = envelope.error.as_deref().unwrap_or("unknown error");
                print_error(&format!("{} prediction failed: {}", task.display_name(), message));
                return Ok(false);
            }

            print_success(&format!("{} prediction", task.display_name()));

            let mut rows: Vec<FieldRow> = match &envelope.prediction {
                Some(serde_json::Value::Object(fields)) => fields
                    .iter()
                    .map(|(field, value)| FieldRow {
                        field: field.clone(),
                        value: display_value(value),
                    })
                    .collect(),
                Some(other) => vec![FieldRow {
                    field: "prediction".to_string(),
                    value: display_value(other),
                }],
                None => Vec::new(),
            };
            if let Some(confidence) = envelope.confidence {
                rows.push(FieldRow {
                    field: "confidence".to_string(),
                    value: color_confidence(confidence),
                });
            }

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!("\n{} {}", "Generated:".dimmed(), envelope.timestamp);
        }
    }

    Ok(envelope.success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("job_title_short=Data Scientist").unwrap(),
            ("job_title_short".to_string(), "Data Scientist".to_string())
        );
        assert_eq!(
            parse_field("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_field("no_separator").is_err());
        assert!(parse_field("=value").is_err());
    }

    #[test]
    fn test_build_request_keeps_text() {
        let request = build_request(&[
            "workers=120".to_string(),
            "skills_text=python, sql".to_string(),
        ])
        .unwrap();
        assert_eq!(request.len(), 2);
        assert_eq!(request.number("workers"), Some(120.0));
        assert_eq!(request.text("skills_text").as_deref(), Some("python, sql"));
    }

    #[test]
    fn test_local_prediction_without_models_fails_cleanly() {
        let dir = tempfile::TempDir::new().unwrap();
        let request = build_request(&["job_title=Analyst".to_string()]).unwrap();
        let ok = predict_local(dir.path(), Task::Benefits, &request, OutputFormat::Json).unwrap();
        assert!(!ok);
    }
}
