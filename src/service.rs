//! Prompt → completion → sanitize → parse → validate orchestration.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::error::{AnalysisError, PipelineError};
use crate::llm::{ChatMessage, CompletionGateway, CompletionRequest};
use crate::models::{pipeline_response_typedef, AnalysisResult, PipelineResponse, RepositoryInput};
use crate::prompt::{
    build_analysis_prompt, build_pipeline_prompt, ANALYSIS_SYSTEM_PROMPT, PIPELINE_SYSTEM_PROMPT,
};
use crate::sanitize::strip_code_fences;
use crate::types::validate;

pub const DEFAULT_MODEL: &str = "gpt-5";

pub const PIPELINE_TEMPERATURE: f32 = 0.7;
pub const PIPELINE_MAX_TOKENS: u32 = 3000;
pub const ANALYSIS_TEMPERATURE: f32 = 0.3;
pub const ANALYSIS_MAX_TOKENS: u32 = 500;

#[derive(Clone)]
pub struct PipelineService {
    gateway: Arc<dyn CompletionGateway>,
    model: String,
}

impl PipelineService {
    pub fn new(gateway: Arc<dyn CompletionGateway>, model: impl Into<String>) -> Self {
        Self { gateway, model: model.into() }
    }

    pub async fn generate_pipeline(
        &self,
        input: &RepositoryInput,
    ) -> Result<PipelineResponse, PipelineError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(PIPELINE_SYSTEM_PROMPT),
                ChatMessage::user(build_pipeline_prompt(input)),
            ],
            temperature: PIPELINE_TEMPERATURE,
            max_tokens: PIPELINE_MAX_TOKENS,
        };

        let started = Instant::now();
        let raw = self.gateway.complete(request).await?;
        tracing::info!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline completion received"
        );

        let value: Value = serde_json::from_str(&strip_code_fences(&raw))?;

        validate(&pipeline_response_typedef(), &value)
            .map_err(|errors| PipelineError::construction(&errors))?;

        let pipeline: PipelineResponse = serde_json::from_value(value)
            .map_err(|e| PipelineError::Construction(e.to_string()))?;

        for stage in pipeline.stages.iter().filter(|s| s.known_type().is_none()) {
            tracing::warn!(stage = %stage.name, stage_type = %stage.stage_type, "unrecognized stage type");
        }
        tracing::debug!(stages = pipeline.stages.len(), "pipeline validated");

        Ok(pipeline)
    }
}

#[derive(Clone)]
pub struct AnalysisService {
    gateway: Arc<dyn CompletionGateway>,
    model: String,
}

impl AnalysisService {
    pub fn new(gateway: Arc<dyn CompletionGateway>, model: impl Into<String>) -> Self {
        Self { gateway, model: model.into() }
    }

    /// Any valid JSON is accepted and returned untouched.
    pub async fn analyze_repository(
        &self,
        input: &RepositoryInput,
    ) -> Result<AnalysisResult, AnalysisError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
                ChatMessage::user(build_analysis_prompt(input)),
            ],
            temperature: ANALYSIS_TEMPERATURE,
            max_tokens: ANALYSIS_MAX_TOKENS,
        };

        let started = Instant::now();
        let raw = self.gateway.complete(request).await?;
        tracing::info!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis completion received"
        );

        Ok(serde_json::from_str(&strip_code_fences(&raw))?)
    }
}
