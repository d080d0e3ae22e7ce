use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::service::DEFAULT_MODEL;

/// Server settings, read from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "pipeline-generator")]
#[command(about = "Test Pipeline Generator API server")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "PIPELINE_BIND_ADDR", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Credential for the completion API
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible completion API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub base_url: String,

    /// Model identifier sent with every completion request
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Timeout for completion requests, in seconds (none by default)
    #[arg(long, env = "LLM_TIMEOUT_SECS")]
    pub llm_timeout_secs: Option<u64>,

    /// Origins allowed by CORS, comma separated
    #[arg(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000,http://localhost:5173"
    )]
    pub cors_origins: Vec<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn llm_timeout(&self) -> Option<Duration> {
        self.llm_timeout_secs.map(Duration::from_secs)
    }
}
