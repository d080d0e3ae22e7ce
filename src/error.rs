use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::types::ValidationError;

/// Failures of the completion API round trip.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion API returned no message content")]
    EmptyResponse,

    /// Free-form failure raised by alternative gateway implementations.
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The sanitized completion text is not syntactically valid JSON.
    #[error("Failed to parse AI response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// The JSON parsed but does not have the pipeline shape.
    #[error("Error generating pipeline: invalid pipeline structure: {0}")]
    Construction(String),

    #[error("Error generating pipeline: {0}")]
    Generation(#[from] GatewayError),
}

impl PipelineError {
    pub fn construction(errors: &[ValidationError]) -> Self {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        PipelineError::Construction(joined)
    }
}

/// Every analysis failure lands in this one category.
#[derive(Error, Debug)]
#[error("Error analyzing repository: {0}")]
pub struct AnalysisError(pub String);

impl From<GatewayError> for AnalysisError {
    fn from(e: GatewayError) -> Self {
        AnalysisError(e.to_string())
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(e: serde_json::Error) -> Self {
        AnalysisError(e.to_string())
    }
}

/// Errors surfaced by the HTTP handlers as `500 {"detail": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        tracing::error!(%detail, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": detail })),
        )
            .into_response()
    }
}
