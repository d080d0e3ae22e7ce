pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod sanitize;
pub mod server;
pub mod service;
pub mod types;
