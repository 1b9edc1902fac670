//! Test fixtures for integration tests
//!
//! Chat completion payloads and small builders shared by the scenarios.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use wiremock::{MockServer, ResponseTemplate};

use trendradar::analysis::{
    AnalysisConfig, AnalysisError, ConnectionState, ConnectionStatus, RadarAnalysis,
    RadarAnalyzer,
};
use trendradar::api::AppState;
use trendradar::models::{Classification, Trend};
use trendradar::partition::Taxonomy;
use trendradar::storage::{create_mock_repository, seed, SharedTrendRepository};

/// Model reply for the voice AI focus area, wrapped in prose
pub const VOICE_AI_REPLY: &str = r#"Here are the tools I found:
[
  {
    "tool_name": "LiveKit Agents",
    "classification": "signal",
    "confidence_score": 92,
    "technical_insight": "WebRTC based pipeline with sub-200ms voice-to-voice latency",
    "signal_evidence": ["Published latency benchmarks"],
    "noise_indicators": [],
    "architectural_verdict": true
  },
  {
    "tool_name": "VoiceHype AI",
    "classification": "noise",
    "confidence_score": 25,
    "technical_insight": "No benchmarks published",
    "signal_evidence": [],
    "noise_indicators": ["Marketing language only"],
    "architectural_verdict": false
  }
]
Let me know if you need more."#;

/// Model reply for agent orchestration; the second entry is invalid
pub const AGENT_ORCHESTRATION_REPLY: &str = r#"[
  {
    "tool_name": "LangGraph",
    "classification": "signal",
    "confidence_score": 88,
    "technical_insight": "Checkpointed graph state with human-in-the-loop interrupts",
    "architectural_verdict": true
  },
  {
    "tool_name": "AutoAgent Pro",
    "classification": "hype",
    "confidence_score": 30,
    "technical_insight": "Unclear",
    "architectural_verdict": false
  }
]"#;

/// Model reply for durable runtimes
pub const DURABLE_RUNTIME_REPLY: &str = r#"```json
[
  {
    "tool_name": "Temporal.io",
    "classification": "signal",
    "confidence_score": 95,
    "technical_insight": "Event-sourced workflow history with deterministic replay",
    "architectural_verdict": true
  }
]
```"#;

/// OpenAI-style completion wrapping `content`
pub fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}

/// Substring of the built-in prompt that identifies a focus area
pub fn prompt_marker(focus_area: &str) -> String {
    format!("tools related to {focus_area}")
}

/// Analysis config pointing at a mock server, with fast retries
pub fn analysis_config(server: &MockServer) -> AnalysisConfig {
    AnalysisConfig {
        base_url: server.uri(),
        prompts_dir: std::env::temp_dir().join("trendradar-it-no-prompts"),
        initial_backoff_ms: 1,
        timeout_secs: 5,
        ..Default::default()
    }
}

pub fn trend(focus_area: &str, tool_name: &str, classification: Classification) -> Trend {
    Trend {
        focus_area: focus_area.to_string(),
        tool_name: tool_name.to_string(),
        classification,
        confidence_score: 80,
        technical_insight: format!("{tool_name} insight"),
        signal_evidence: vec![],
        noise_indicators: vec![],
        architectural_verdict: classification == Classification::Signal,
        timestamp: "2026-02-01T08:00:00Z".to_string(),
    }
}

pub fn seeded_repo() -> SharedTrendRepository {
    let repo = create_mock_repository();
    seed(repo.as_ref()).expect("seed mock repository");
    repo
}

pub fn seeded_state() -> AppState {
    AppState::new(seeded_repo(), Arc::new(Taxonomy::radar_default()))
}

/// Analyzer returning a fixed analysis and counting runs
pub struct StubAnalyzer {
    pub analysis: RadarAnalysis,
    pub runs: AtomicUsize,
}

impl StubAnalyzer {
    pub fn new(radar_date: &str, trends: Vec<Trend>) -> Arc<Self> {
        Arc::new(Self {
            analysis: RadarAnalysis {
                radar_date: radar_date.to_string(),
                trends,
            },
            runs: AtomicUsize::new(0),
        })
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RadarAnalyzer for StubAnalyzer {
    async fn run_full_analysis(&self) -> Result<RadarAnalysis, AnalysisError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(self.analysis.clone())
    }

    async fn check_connection(&self) -> ConnectionStatus {
        ConnectionStatus {
            status: ConnectionState::Ok,
            message: "stub".to_string(),
            provider: "stub".to_string(),
            model: "stub-model".to_string(),
            base_url: "http://stub".to_string(),
        }
    }
}

/// Analyzer whose runs always fail
pub struct FailingAnalyzer;

#[async_trait]
impl RadarAnalyzer for FailingAnalyzer {
    async fn run_full_analysis(&self) -> Result<RadarAnalysis, AnalysisError> {
        Err(AnalysisError::RetriesExhausted {
            attempts: 3,
            message: "upstream unavailable".to_string(),
        })
    }

    async fn check_connection(&self) -> ConnectionStatus {
        ConnectionStatus {
            status: ConnectionState::Error,
            message: "down".to_string(),
            provider: "stub".to_string(),
            model: "stub-model".to_string(),
            base_url: "http://stub".to_string(),
        }
    }
}

/// Tool names in a JSON array of trends
pub fn json_tool_names(items: &Value) -> Vec<String> {
    items
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["tool_name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
