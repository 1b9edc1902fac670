//! Radar analysis through an OpenAI-compatible chat endpoint
//!
//! The analyzer asks the model for tools discussed in each focus area,
//! validates the returned JSON and produces the trends of one radar run.
//! Requests go to a LiteLLM proxy by default.

mod client;
pub mod parse;
pub mod prompt;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ErrorCategory, RadarErrorTrait};
use crate::models::Trend;
use crate::utils::retry::RetryConfig;

pub use client::LlmRadarAnalyzer;
pub use prompt::FocusAreaProfile;

/// Configuration for the analysis client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Proxy base URL (default: http://localhost:4010)
    pub base_url: String,

    /// Bearer key sent to the proxy
    pub api_key: String,

    /// Model name as known to the proxy
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Directory holding `<area>_prompt.md` overrides
    pub prompts_dir: PathBuf,

    /// Attempts per focus area, including the first
    pub max_attempts: u32,

    /// Delay before the first retry, doubled on each further retry
    pub initial_backoff_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4010".to_string(),
            api_key: "sk-radar-local-dev".to_string(),
            model: "grok-3".to_string(),
            timeout_secs: 120,
            temperature: 0.7,
            prompts_dir: PathBuf::from("prompts"),
            max_attempts: 3,
            initial_backoff_ms: 1000,
        }
    }
}

impl AnalysisConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("LITELLM_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("LITELLM_API_KEY").unwrap_or(defaults.api_key),
            model: std::env::var("GROK_MODEL").unwrap_or(defaults.model),
            timeout_secs: std::env::var("RADAR_ANALYSIS_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            prompts_dir: std::env::var("RADAR_PROMPTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.prompts_dir),
            ..defaults
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            anyhow::bail!("analysis base_url must be an http(s) URL");
        }

        if self.model.trim().is_empty() {
            anyhow::bail!("analysis model must not be empty");
        }

        if self.max_attempts == 0 {
            anyhow::bail!("analysis max_attempts must be greater than 0");
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!("analysis temperature must be between 0.0 and 2.0");
        }

        Ok(())
    }

    /// Retry policy for chat requests
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::with_delays(
            self.max_attempts.saturating_sub(1),
            self.initial_backoff_ms,
            30_000,
        )
    }

    /// Chat completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Errors raised by the analysis client
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Request to analysis endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Analysis endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Analysis response had no content")]
    EmptyResponse,

    #[error("No JSON array found in analysis response")]
    NoJsonArray,

    #[error("Invalid JSON in analysis response: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("All {attempts} analysis attempts failed: {message}")]
    RetriesExhausted { attempts: u32, message: String },
}

impl RadarErrorTrait for AnalysisError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Request(_) | Self::RetriesExhausted { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::EmptyResponse => true,
            Self::NoJsonArray | Self::InvalidJson(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Request(_) | Self::RetriesExhausted { .. } => ErrorCategory::Network,
            Self::Status { .. } | Self::EmptyResponse => ErrorCategory::Analysis,
            Self::NoJsonArray | Self::InvalidJson(_) => ErrorCategory::Parsing,
        }
    }
}

/// Trends produced by one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarAnalysis {
    pub radar_date: String,
    pub trends: Vec<Trend>,
}

/// Outcome of a connection probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Ok,
    Error,
}

/// Connection probe report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub status: ConnectionState,
    pub message: String,
    pub provider: String,
    pub model: String,
    pub base_url: String,
}

impl ConnectionStatus {
    pub fn is_ok(&self) -> bool {
        self.status == ConnectionState::Ok
    }
}

/// Source of radar trends
#[async_trait]
pub trait RadarAnalyzer: Send + Sync {
    /// Analyze every focus area for today's radar
    ///
    /// A failing focus area contributes no trends; the run itself still
    /// succeeds.
    async fn run_full_analysis(&self) -> Result<RadarAnalysis, AnalysisError>;

    /// Probe the analysis endpoint
    async fn check_connection(&self) -> ConnectionStatus;
}
