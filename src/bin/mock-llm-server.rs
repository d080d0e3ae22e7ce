use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Clone)]
struct AppState {
    attempt_count: Arc<AtomicUsize>,
    fail_attempts: usize,
    fenced: bool,
}

const PIPELINE_REPLY: &str = r#"{
    "stages": [
        {
            "name": "Unit Tests (Backend)",
            "type": "unit_test_backend",
            "description": "Run backend unit tests with coverage",
            "commands": ["pip install -r requirements.txt", "pytest tests/unit --cov=app"],
            "tools": ["pytest", "pytest-cov"],
            "estimatedDuration": "3m"
        },
        {
            "name": "Unit Tests (Frontend)",
            "type": "unit_test_frontend",
            "description": "Run component tests",
            "commands": ["npm ci", "npm test -- --watch=false"],
            "tools": ["vitest", "testing-library"],
            "estimatedDuration": "2m"
        },
        {
            "name": "Integration Tests (Backend)",
            "type": "integration_test_backend",
            "description": "Exercise API endpoints against a test client",
            "commands": ["pytest tests/integration"],
            "tools": ["pytest", "httpx"],
            "estimatedDuration": "5m"
        },
        {
            "name": "Integration Tests (Frontend)",
            "type": "integration_test_frontend",
            "description": "Drive user flows in a headless browser",
            "commands": ["npx playwright test"],
            "tools": ["playwright"],
            "estimatedDuration": "8m"
        },
        {
            "name": "Code Quality Analysis",
            "type": "code_quality",
            "description": "Lint, type-check and measure coverage",
            "commands": ["ruff check .", "mypy app", "npm run lint"],
            "tools": ["ruff", "mypy", "eslint", "sonarqube"],
            "estimatedDuration": "4m"
        },
        {
            "name": "Performance Tests",
            "type": "performance_test",
            "description": "Load test the main endpoints",
            "commands": ["locust -f perf/locustfile.py --headless -u 50 -r 5 -t 2m"],
            "tools": ["locust"],
            "estimatedDuration": "6m"
        },
        {
            "name": "Security Tests",
            "type": "security_test",
            "description": "Scan code and dependencies for known vulnerabilities",
            "commands": ["bandit -r app", "pip-audit", "npm audit --audit-level=high"],
            "tools": ["bandit", "pip-audit", "npm audit"],
            "estimatedDuration": "3m"
        }
    ],
    "summary": "Seven-stage pipeline covering unit, integration, quality, performance and security checks.",
    "recommendations": [
        "Add contract tests for the public API",
        "Fail the build when coverage drops below 80%"
    ]
}"#;

const ANALYSIS_REPLY: &str = r#"{
    "language": "Python",
    "framework": "FastAPI",
    "projectType": "API",
    "recommendedTools": ["pytest", "httpx", "ruff"]
}"#;

async fn chat_completions(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Json<Value> {
    let attempt = state.attempt_count.fetch_add(1, Ordering::SeqCst) + 1;

    let system = req
        .messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.as_str())
        .unwrap_or("");
    let prompt = req
        .messages
        .iter()
        .find(|m| m.role == "user")
        .map(|m| m.content.as_str())
        .unwrap_or("");

    println!("Mock LLM: request {} for model {}", attempt, req.model);
    println!("Prompt preview: {}...", prompt.chars().take(200).collect::<String>());

    let output = if attempt <= state.fail_attempts {
        println!("Mock LLM: returning invalid JSON");
        "not json".to_string()
    } else {
        let body = if system.contains("code analysis") {
            ANALYSIS_REPLY
        } else {
            PIPELINE_REPLY
        };
        if state.fenced {
            format!("```json\n{body}\n```")
        } else {
            body.to_string()
        }
    };

    Json(json!({
        "id": format!("mock-{attempt}"),
        "object": "chat.completion",
        "model": req.model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": output },
            "finish_reason": "stop"
        }]
    }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::var("MOCK_LLM_PORT")
        .unwrap_or_else(|_| "8081".to_string())
        .parse::<u16>()
        .unwrap_or(8081);

    let fail_attempts = std::env::var("MOCK_LLM_FAIL_ATTEMPTS")
        .unwrap_or_else(|_| "0".to_string())
        .parse::<usize>()
        .unwrap_or(0);

    let fenced = std::env::var("MOCK_LLM_FENCED").is_ok_and(|v| v == "1" || v == "true");

    let state = AppState {
        attempt_count: Arc::new(AtomicUsize::new(0)),
        fail_attempts,
        fenced,
    };

    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/chat/completions", post(chat_completions))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    println!("Mock LLM server listening on http://{}", addr);
    println!("Will return invalid JSON for the first {} request(s)", fail_attempts);
    println!("Point OPENAI_BASE_URL at http://{}/v1", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
