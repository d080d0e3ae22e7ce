//! Router-level tests for the HTTP surface.
//!
//! The completion gateway is replaced by an in-memory double, so every test
//! runs without network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use pipeline_generator::error::GatewayError;
use pipeline_generator::llm::{CompletionGateway, CompletionRequest};
use pipeline_generator::server::{cors_layer, router, AppState};

// ============================================================================
// Test Infrastructure
// ============================================================================

struct ScriptedGateway {
    reply: Result<String, String>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl ScriptedGateway {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        self.reply.clone().map_err(GatewayError::Other)
    }
}

fn app(gateway: Arc<ScriptedGateway>) -> Router {
    router(AppState::new(gateway, "gpt-5"))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

const PIPELINE_REPLY: &str = r#"{"stages": [{"name":"Unit Tests Backend","type":"unit_test_backend","description":"Test backend components","commands":["pytest"],"tools":["pytest"],"estimatedDuration":"2m"}], "summary":"All good", "recommendations":["increase coverage"]}"#;

const ANALYSIS_REPLY: &str = r#"{"language":"Python","framework":"FastAPI","projectType":"API","recommendedTools":["pytest","ruff"]}"#;

fn repo_body() -> Value {
    json!({
        "repository_url": "https://github.com/acme/shop",
        "repository_content": "from fastapi import FastAPI\napp = FastAPI()",
        "language": "Python",
        "framework": "FastAPI"
    })
}

// ============================================================================
// Static endpoints
// ============================================================================

#[tokio::test]
async fn test_root_returns_banner_without_gateway_call() {
    let gateway = ScriptedGateway::replying(PIPELINE_REPLY);
    let (status, body) = send(app(gateway.clone()), Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Test Pipeline Generator API", "version": "1.0.0"}));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_health_returns_healthy_without_gateway_call() {
    let gateway = ScriptedGateway::replying(PIPELINE_REPLY);
    let (status, body) = send(app(gateway.clone()), Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy"}));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let gateway = ScriptedGateway::replying(PIPELINE_REPLY);
    let (status, _) = send(app(gateway), Method::GET, "/api/users", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// generate-pipeline
// ============================================================================

#[tokio::test]
async fn test_generate_pipeline_reproduces_completion() {
    let gateway = ScriptedGateway::replying(PIPELINE_REPLY);
    let (status, body) = send(
        app(gateway.clone()),
        Method::POST,
        "/api/generate-pipeline",
        Some(repo_body()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::from_str::<Value>(PIPELINE_REPLY).unwrap());
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn test_generate_pipeline_sends_fixed_sampling_parameters() {
    let gateway = ScriptedGateway::replying(PIPELINE_REPLY);
    send(app(gateway.clone()), Method::POST, "/api/generate-pipeline", Some(repo_body())).await;

    let request = gateway.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.model, "gpt-5");
    assert_eq!(request.temperature, 0.7);
    assert_eq!(request.max_tokens, 3000);
    assert_eq!(request.messages.len(), 2);
    assert!(request.messages[1].content.contains("- Framework: FastAPI"));
}

#[tokio::test]
async fn test_generate_pipeline_accepts_empty_body_object() {
    let gateway = ScriptedGateway::replying(PIPELINE_REPLY);
    let (status, _) = send(app(gateway.clone()), Method::POST, "/api/generate-pipeline", Some(json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    let request = gateway.last_request.lock().unwrap().clone().unwrap();
    assert!(request.messages[1].content.contains("- URL: Not provided"));
}

#[tokio::test]
async fn test_generate_pipeline_strips_markdown_fence() {
    let fenced = format!("```json\n{PIPELINE_REPLY}\n```");
    let gateway = ScriptedGateway::replying(&fenced);
    let (status, body) = send(app(gateway), Method::POST, "/api/generate-pipeline", Some(repo_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "All good");
}

#[tokio::test]
async fn test_generate_pipeline_not_json_is_parse_failure() {
    let gateway = ScriptedGateway::replying("not json");
    let (status, body) = send(app(gateway), Method::POST, "/api/generate-pipeline", Some(repo_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Failed to parse AI response: "), "{detail}");
}

#[tokio::test]
async fn test_generate_pipeline_wrong_shape_is_generation_failure() {
    let gateway = ScriptedGateway::replying(r#"{"stages": "none", "summary": "x", "recommendations": []}"#);
    let (status, body) = send(app(gateway), Method::POST, "/api/generate-pipeline", Some(repo_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error generating pipeline: "), "{detail}");
    assert!(detail.contains("$.stages"));
}

#[tokio::test]
async fn test_generate_pipeline_gateway_failure() {
    let gateway = ScriptedGateway::failing("connection refused");
    let (status, body) = send(app(gateway), Method::POST, "/api/generate-pipeline", Some(repo_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Error generating pipeline: connection refused");
}

#[tokio::test]
async fn test_generate_pipeline_rejects_wrongly_typed_body() {
    let gateway = ScriptedGateway::replying(PIPELINE_REPLY);
    let (status, _) = send(
        app(gateway.clone()),
        Method::POST,
        "/api/generate-pipeline",
        Some(json!({"repository_url": 42})),
    )
    .await;

    assert!(status.is_client_error());
    assert_eq!(gateway.calls(), 0);
}

// ============================================================================
// analyze-repository
// ============================================================================

#[tokio::test]
async fn test_analyze_repository_reproduces_completion() {
    let gateway = ScriptedGateway::replying(ANALYSIS_REPLY);
    let (status, body) = send(
        app(gateway.clone()),
        Method::POST,
        "/api/analyze-repository",
        Some(repo_body()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::from_str::<Value>(ANALYSIS_REPLY).unwrap());

    let request = gateway.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.temperature, 0.3);
    assert_eq!(request.max_tokens, 500);
}

#[tokio::test]
async fn test_analyze_repository_passes_extra_fields_through() {
    let gateway = ScriptedGateway::replying(r#"{"language": "Rust", "confidence": 0.8}"#);
    let (status, body) = send(app(gateway), Method::POST, "/api/analyze-repository", Some(repo_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"language": "Rust", "confidence": 0.8}));
}

#[tokio::test]
async fn test_analyze_repository_returns_array_reply_as_is() {
    let gateway = ScriptedGateway::replying(r#"["pytest", "ruff"]"#);
    let (status, body) = send(app(gateway), Method::POST, "/api/analyze-repository", Some(repo_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["pytest", "ruff"]));
}

#[tokio::test]
async fn test_analyze_repository_gateway_failure() {
    let gateway = ScriptedGateway::failing("rate limited by provider");
    let (status, body) = send(app(gateway), Method::POST, "/api/analyze-repository", Some(repo_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("Error analyzing repository"));
    assert!(detail.contains("rate limited by provider"));
}

#[tokio::test]
async fn test_analyze_repository_not_json_uses_same_category() {
    let gateway = ScriptedGateway::replying("not json");
    let (status, body) = send(app(gateway), Method::POST, "/api/analyze-repository", Some(repo_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().starts_with("Error analyzing repository: "));
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let gateway = ScriptedGateway::replying(PIPELINE_REPLY);
    let origins = vec!["http://localhost:3000".to_string()];
    let app = app(gateway).layer(cors_layer(&origins).unwrap());

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/generate-pipeline")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_ignores_unlisted_origin() {
    let gateway = ScriptedGateway::replying(PIPELINE_REPLY);
    let origins = vec!["http://localhost:3000".to_string()];
    let app = app(gateway).layer(cors_layer(&origins).unwrap());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "https://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
