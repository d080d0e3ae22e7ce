use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::extract::State;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::llm::CompletionGateway;
use crate::models::{AnalysisResult, PipelineResponse, RepositoryInput};
use crate::service::{AnalysisService, PipelineService};

pub const API_TITLE: &str = "Test Pipeline Generator API";
pub const API_VERSION: &str = "1.0.0";

#[derive(Clone)]
pub struct AppState {
    pub pipelines: PipelineService,
    pub analysis: AnalysisService,
}

impl AppState {
    pub fn new(gateway: Arc<dyn CompletionGateway>, model: &str) -> Self {
        Self {
            pipelines: PipelineService::new(gateway.clone(), model),
            analysis: AnalysisService::new(gateway, model),
        }
    }
}

/// Routes without CORS, used directly by tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/generate-pipeline", post(generate_pipeline))
        .route("/api/analyze-repository", post(analyze_repository))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(|o| HeaderValue::from_str(o).map_err(|e| anyhow!("Invalid CORS origin {o:?}: {e}")))
        .collect::<Result<Vec<_>>>()?;

    // Credentials forbid wildcards, so methods and headers are mirrored.
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": API_TITLE, "version": API_VERSION }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn generate_pipeline(
    State(state): State<Arc<AppState>>,
    Json(input): Json<RepositoryInput>,
) -> Result<Json<PipelineResponse>, ApiError> {
    let pipeline = state.pipelines.generate_pipeline(&input).await?;
    Ok(Json(pipeline))
}

async fn analyze_repository(
    State(state): State<Arc<AppState>>,
    Json(input): Json<RepositoryInput>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let analysis = state.analysis.analyze_repository(&input).await?;
    Ok(Json(analysis))
}
