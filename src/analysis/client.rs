use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::parse::parse_trends;
use super::prompt::{build_prompt, FocusAreaProfile};
use super::{
    AnalysisConfig, AnalysisError, ConnectionState, ConnectionStatus, RadarAnalysis,
    RadarAnalyzer,
};
use crate::metrics;
use crate::models::Trend;
use crate::utils::retry::with_retry;
use crate::utils::{truncate_text, utc_timestamp, utc_today};

const PROVIDER: &str = "litellm_proxy";
const PROBE_PROMPT: &str = "Say 'OK' if you can hear me.";

/// OpenAI-style chat completion request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Analyzer backed by a chat completion endpoint
pub struct LlmRadarAnalyzer {
    client: Client,
    config: AnalysisConfig,
}

impl LlmRadarAnalyzer {
    /// Create an analyzer with a custom config
    pub fn with_config(config: AnalysisConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Create an analyzer from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::with_config(AnalysisConfig::from_env())
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Send one chat completion and return the trimmed reply
    async fn complete(
        &self,
        prompt: &str,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Result<String, AnalysisError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status,
                body: truncate_text(&body, 500),
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(AnalysisError::EmptyResponse)
    }

    /// Chat completion with exponential backoff
    async fn complete_with_retry(&self, prompt: &str) -> Result<String, AnalysisError> {
        let retry = self.config.retry_config();
        let temperature = Some(self.config.temperature);

        with_retry(&retry, || async move {
            self.complete(prompt, temperature, None)
                .await
                .map_err(anyhow::Error::from)
        })
        .await
        .map_err(|e| AnalysisError::RetriesExhausted {
            attempts: retry.attempts(),
            message: format!("{e:#}"),
        })
    }

    /// Analyze one focus area
    pub async fn analyze_focus_area(
        &self,
        profile: &FocusAreaProfile,
    ) -> Result<Vec<Trend>, AnalysisError> {
        let focus_area = profile.area.as_str();
        let _timer = metrics::start_analysis_timer(focus_area);

        let prompt = build_prompt(profile, &self.config.prompts_dir);
        info!(focus_area, "Analyzing focus area");

        let content = self.complete_with_retry(&prompt).await?;
        let trends = parse_trends(&content, focus_area, &utc_timestamp())?;

        info!(focus_area, count = trends.len(), "Found valid trends");
        Ok(trends)
    }
}

#[async_trait]
impl RadarAnalyzer for LlmRadarAnalyzer {
    async fn run_full_analysis(&self) -> Result<RadarAnalysis, AnalysisError> {
        let radar_date = utc_today();
        info!(radar_date = %radar_date, "Starting full radar analysis");

        let mut trends = Vec::new();
        for profile in FocusAreaProfile::all() {
            match self.analyze_focus_area(&profile).await {
                Ok(found) => trends.extend(found),
                Err(e) => error!(
                    focus_area = profile.area.as_str(),
                    error = %e,
                    "Focus area analysis failed"
                ),
            }
        }

        info!(total = trends.len(), "Analysis complete");
        Ok(RadarAnalysis { radar_date, trends })
    }

    async fn check_connection(&self) -> ConnectionStatus {
        let (status, message) = match self.complete(PROBE_PROMPT, None, Some(10)).await {
            Ok(_) => (
                ConnectionState::Ok,
                "Analysis API connection successful".to_string(),
            ),
            Err(e) => {
                warn!(error = %e, "Analysis API probe failed");
                (
                    ConnectionState::Error,
                    format!("Analysis API connection failed: {e}"),
                )
            }
        };

        ConnectionStatus {
            status,
            message,
            provider: PROVIDER.to_string(),
            model: self.config.model.clone(),
            base_url: self.config.base_url.clone(),
        }
    }
}
