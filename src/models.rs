use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{FieldDef, TypeDef};

/// Repository metadata posted by the frontend. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryInput {
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub repository_content: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    pub name: String,
    /// One of the [`StageType`] tags in practice, but kept as free text.
    #[serde(rename = "type")]
    pub stage_type: String,
    pub description: String,
    pub commands: Vec<String>,
    pub tools: Vec<String>,
    pub estimated_duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub stages: Vec<PipelineStage>,
    pub summary: String,
    pub recommendations: Vec<String>,
}

/// Repository classification as returned by the model.
///
/// The shape is not guaranteed. An object with `language`, `framework`,
/// `projectType` and `recommendedTools` is expected, but any valid JSON
/// document is passed through.
pub type AnalysisResult = Value;

/// The stage categories the pipeline prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageType {
    UnitTestBackend,
    UnitTestFrontend,
    IntegrationTestBackend,
    IntegrationTestFrontend,
    CodeQuality,
    PerformanceTest,
    SecurityTest,
}

impl StageType {
    pub const ALL: [StageType; 7] = [
        StageType::UnitTestBackend,
        StageType::UnitTestFrontend,
        StageType::IntegrationTestBackend,
        StageType::IntegrationTestFrontend,
        StageType::CodeQuality,
        StageType::PerformanceTest,
        StageType::SecurityTest,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            StageType::UnitTestBackend => "unit_test_backend",
            StageType::UnitTestFrontend => "unit_test_frontend",
            StageType::IntegrationTestBackend => "integration_test_backend",
            StageType::IntegrationTestFrontend => "integration_test_frontend",
            StageType::CodeQuality => "code_quality",
            StageType::PerformanceTest => "performance_test",
            StageType::SecurityTest => "security_test",
        }
    }

    /// Title and one-line description used in the prompt.
    pub fn describe(self) -> (&'static str, &'static str) {
        match self {
            StageType::UnitTestBackend => (
                "Unit Tests (Backend)",
                "Tests for individual backend components, functions, and classes",
            ),
            StageType::UnitTestFrontend => (
                "Unit Tests (Frontend)",
                "Tests for individual frontend components and functions",
            ),
            StageType::IntegrationTestBackend => (
                "Integration Tests (Backend)",
                "Tests for API endpoints, database interactions, and service integrations",
            ),
            StageType::IntegrationTestFrontend => (
                "Integration Tests (Frontend)",
                "Tests for component interactions, API calls, and user flows",
            ),
            StageType::CodeQuality => (
                "Code Quality Analysis",
                "Static code analysis, linting, code coverage, and security scanning (SonarQube-like)",
            ),
            StageType::PerformanceTest => (
                "Performance Tests",
                "Load testing, stress testing, and performance benchmarks",
            ),
            StageType::SecurityTest => (
                "Security Tests",
                "Vulnerability scanning, dependency checks, and security best practices",
            ),
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

impl PipelineStage {
    pub fn known_type(&self) -> Option<StageType> {
        StageType::from_tag(&self.stage_type)
    }
}

// TypeDef for PipelineResponse (for validation of LLM JSON)
pub fn pipeline_response_typedef() -> TypeDef {
    let strings = || TypeDef::List(Box::new(TypeDef::Text));

    TypeDef::Object(vec![
        FieldDef::new(
            "stages",
            TypeDef::List(Box::new(TypeDef::Object(vec![
                FieldDef::new("name", TypeDef::Text),
                FieldDef::new("type", TypeDef::Text),
                FieldDef::new("description", TypeDef::Text),
                FieldDef::new("commands", strings()),
                FieldDef::new("tools", strings()),
                FieldDef::new("estimatedDuration", TypeDef::Text),
            ]))),
        ),
        FieldDef::new("summary", TypeDef::Text),
        FieldDef::new("recommendations", strings()),
    ])
}
