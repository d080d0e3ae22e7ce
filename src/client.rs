use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::models::{AnalysisResult, PipelineResponse, RepositoryInput};

/// HTTP client for a running pipeline generator server.
pub struct PipelineApiClient {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

impl PipelineApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {e}"))?;

        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn generate_pipeline(&self, input: &RepositoryInput) -> Result<PipelineResponse> {
        self.post("/api/generate-pipeline", input).await
    }

    pub async fn analyze_repository(&self, input: &RepositoryInput) -> Result<AnalysisResult> {
        self.post("/api/analyze-repository", input).await
    }

    pub async fn generate_pipeline_with_timeout(
        &self,
        input: &RepositoryInput,
        timeout: Duration,
    ) -> Result<PipelineResponse> {
        tokio::time::timeout(timeout, self.generate_pipeline(input))
            .await
            .map_err(|_| anyhow!("Request timed out after {:?}", timeout))?
    }

    pub async fn analyze_repository_with_timeout(
        &self,
        input: &RepositoryInput,
        timeout: Duration,
    ) -> Result<AnalysisResult> {
        tokio::time::timeout(timeout, self.analyze_repository(input))
            .await
            .map_err(|_| anyhow!("Request timed out after {:?}", timeout))?
    }

    async fn post<O: DeserializeOwned>(&self, path: &str, input: &RepositoryInput) -> Result<O> {
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .http
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(|e| anyhow!("HTTP call failed: {e}. URL: {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.detail)
                .unwrap_or(text);
            return Err(anyhow!("Server returned {status}: {detail}"));
        }

        resp.json()
            .await
            .map_err(|e| anyhow!("Failed to decode response: {e}"))
    }
}
