//! Integration tests for the prediction server endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use inference_lib::registry::{InferenceEngine, ModelArtifact, ModelKind, RawOutput};
use inference_lib::{ModelRegistry, PredictionService, ServiceHealth};
use prediction_server::api::{create_router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

/// Regressor that always returns the same value
struct Constant(f64);

impl InferenceEngine for Constant {
    fn run(&self, _features: &[f32]) -> anyhow::Result<RawOutput> {
        Ok(RawOutput {
            values: vec![self.0],
            probabilities: None,
        })
    }

    fn backend(&self) -> &'static str {
        "constant"
    }
}

fn setup_test_app(registry: ModelRegistry, ready: bool) -> (Router, Arc<AppState>) {
    let registry = Arc::new(registry);
    let health = Arc::new(ServiceHealth::new(registry.clone()));
    health.set_ready(ready);
    let service = Arc::new(PredictionService::new(registry));

    let state = Arc::new(AppState::new(service, health));
    let router = create_router(state.clone());

    (router, state)
}

fn revenue_registry() -> ModelRegistry {
    ModelRegistry::builder()
        .with_artifact(ModelArtifact::new(
            "revenue_growth",
            ModelKind::Regressor,
            Box::new(Constant(10.0)),
        ))
        .build()
}

fn full_registry() -> ModelRegistry {
    ["salary", "remote_work", "degree_mention", "health_insurance", "campaign_conversion",
     "company_growth", "revenue_growth", "benefits", "job_title"]
        .into_iter()
        .fold(ModelRegistry::builder(), |builder, name| {
            builder.with_artifact(ModelArtifact::new(
                name,
                ModelKind::Regressor,
                Box::new(Constant(1.0)),
            ))
        })
        .build()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let (app, _state) = setup_test_app(full_registry(), true);

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
}

#[tokio::test]
async fn test_healthz_returns_ok_when_degraded() {
    let (app, _state) = setup_test_app(revenue_registry(), true);

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Missing artifacts only disable their own task
    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["components"]["revenue_growth"]["status"], "healthy");
    assert_eq!(health["components"]["salary"]["status"], "degraded");
}

#[tokio::test]
async fn test_healthz_returns_503_with_no_models() {
    let (app, _state) = setup_test_app(ModelRegistry::empty(), true);

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let health = body_json(response).await;
    assert_eq!(health["status"], "unhealthy");
}

#[tokio::test]
async fn test_readyz_follows_ready_flag() {
    let (app, state) = setup_test_app(revenue_registry(), false);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let readiness = body_json(response).await;
    assert_eq!(readiness["ready"], false);
    assert_eq!(readiness["reason"], "Service not yet initialized");

    state.health.set_ready(true);
    let response = app
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_predict_success_envelope() {
    let (app, _state) = setup_test_app(revenue_registry(), true);

    let response = app
        .oneshot(post_json(
            "/api/v1/predict/revenue_growth",
            serde_json::json!({
                "company_name": "Acme",
                "industry": "Retail",
                "current_revenue": 1000000,
                "market_share": "5"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], true);
    assert_eq!(result["model_type"], "revenue_growth");
    assert_eq!(result["prediction"]["growth_rate"], 10.0);
    assert_eq!(result["prediction"]["projected_revenue"], 1100000.0);
}

#[tokio::test]
async fn test_predict_failures_are_still_200() {
    let (app, _state) = setup_test_app(revenue_registry(), true);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/predict/revenue_growth",
            serde_json::json!({ "company_name": "Acme" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], false);
    assert_eq!(result["error_kind"], "validation");

    let response = app
        .oneshot(post_json(
            "/api/v1/predict/benefits",
            serde_json::json!({
                "job_title": "Analyst",
                "company_size": "small",
                "location": "Canada"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], false);
    assert_eq!(result["error"], "Benefits prediction model is not available");
}

#[tokio::test]
async fn test_unknown_task_is_404() {
    let (app, _state) = setup_test_app(revenue_registry(), true);

    let response = app
        .oneshot(post_json("/api/v1/predict/horoscope", serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unknown prediction task: horoscope");
}

#[tokio::test]
async fn test_models_lists_load_report() {
    let dir = tempfile::TempDir::new().unwrap();
    let registry = ModelRegistry::load_all(&inference_lib::RegistryConfig::with_model_dir(dir.path()));
    let (app, _state) = setup_test_app(registry, true);

    let response = app
        .oneshot(Request::builder().uri("/api/v1/models").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    let entries = report.as_array().unwrap();
    assert_eq!(entries.len(), 9);
    assert!(entries.iter().all(|e| e["status"] == "missing"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _state) = setup_test_app(revenue_registry(), true);

    // Serve one prediction so the counters have samples
    let _ = app
        .clone()
        .oneshot(post_json(
            "/api/v1/predict/revenue_growth",
            serde_json::json!({
                "company_name": "Acme",
                "industry": "Retail",
                "current_revenue": 10,
                "market_share": 1
            }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("jobpred_predictions_total"));
    assert!(text.contains("jobpred_prediction_latency_seconds"));
}
