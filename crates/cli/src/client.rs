//! API client for communicating with the prediction server

use anyhow::{Context, Result};
use inference_lib::health::HealthResponse;
use inference_lib::registry::LoadOutcome;
use inference_lib::{PredictionRequest, Task};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for the prediction server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    pub async fn predict(&self, task: Task, request: &PredictionRequest) -> Result<PredictionEnvelope> {
        self.post(&format!("api/v1/predict/{}", task), request).await
    }

    pub async fn models(&self) -> Result<Vec<LoadOutcome>> {
        self.get("api/v1/models").await
    }

    /// Service health; an unhealthy service answers 503 with the same body
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.base_url.join("healthz").context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::SERVICE_UNAVAILABLE {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }
}

// API response types

/// Prediction envelope as seen by callers; the payload stays untyped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEnvelope {
    pub success: bool,
    pub model_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_lib::health::ComponentStatus;
    use inference_lib::registry::LoadStatus;

    #[tokio::test]
    async fn test_predict_posts_fields_to_task_route() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/predict/salary")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "job_title_short": "Data Scientist",
                "skills_text": "python, sql"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success": true, "model_type": "salary",
                    "prediction": {"prediction": "$124,505", "salary_value": 124505},
                    "timestamp": "2024-03-15T10:30:00.000000"}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let request = PredictionRequest::new()
            .with("job_title_short", "Data Scientist")
            .with("skills_text", "python, sql");
        let envelope = client.predict(Task::Salary, &request).await.unwrap();

        mock.assert_async().await;
        assert!(envelope.success);
        assert_eq!(
            envelope.prediction.unwrap()["prediction"],
            serde_json::json!("$124,505")
        );
        assert!(envelope.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_envelope_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/predict/benefits")
            .with_status(200)
            .with_body(
                r#"{"success": false, "model_type": "benefits",
                    "timestamp": "2024-03-15T10:30:00.000000",
                    "error": "Benefits prediction model is not available",
                    "error_kind": "artifact_unavailable"}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let envelope = client
            .predict(Task::Benefits, &PredictionRequest::new())
            .await
            .unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.error_kind.as_deref(), Some("artifact_unavailable"));
    }

    #[tokio::test]
    async fn test_http_errors_carry_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/models")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.models().await.unwrap_err();
        assert_eq!(err.to_string(), "API error (500 Internal Server Error): boom");
    }

    #[tokio::test]
    async fn test_models_parses_load_report() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/models")
            .with_status(200)
            .with_body(
                r#"[{"name": "salary", "status": "loaded", "decoder": "onnx-optimized",
                     "kind": "regressor", "feature_count": 42},
                    {"name": "benefits", "status": "missing", "error": "not found"}]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let report = client.models().await.unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].status, LoadStatus::Loaded);
        assert_eq!(report[0].feature_count, Some(42));
        assert_eq!(report[1].status, LoadStatus::Missing);
    }

    #[tokio::test]
    async fn test_health_accepts_unavailable_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/healthz")
            .with_status(503)
            .with_body(
                r#"{"status": "unhealthy", "components": {
                    "registry": {"status": "unhealthy", "message": "no model artifacts loaded",
                                 "last_check_timestamp": 1710498600}}}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let health = client.health().await.unwrap();
        assert_eq!(health.status, ComponentStatus::Unhealthy);
    }
}
