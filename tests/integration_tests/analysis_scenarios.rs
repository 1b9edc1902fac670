//! Analysis scenario integration tests
//!
//! Runs the analyzer against a mock chat completion endpoint:
//! 1. A full run across every focus area
//! 2. One focus area failing while the others succeed
//! 3. Prompt overrides from the prompts directory
//! 4. Refresh end-to-end through the HTTP API

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trendradar::analysis::{
    AnalysisConfig, ConnectionState, FocusAreaProfile, LlmRadarAnalyzer, RadarAnalyzer,
};
use trendradar::api::create_router;
use trendradar::models::{Classification, FocusArea};
use trendradar::utils::utc_today;

use super::fixtures::{
    analysis_config, chat_reply, prompt_marker, seeded_state, AGENT_ORCHESTRATION_REPLY,
    DURABLE_RUNTIME_REPLY, VOICE_AI_REPLY,
};

async fn mount_area(server: &MockServer, focus_area: &str, reply: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(prompt_marker(focus_area)))
        .respond_with(reply)
        .mount(server)
        .await;
}

async fn mount_all_areas(server: &MockServer) {
    mount_area(server, "voice_ai_ux", chat_reply(VOICE_AI_REPLY)).await;
    mount_area(server, "agent_orchestration", chat_reply(AGENT_ORCHESTRATION_REPLY)).await;
    mount_area(server, "durable_runtime", chat_reply(DURABLE_RUNTIME_REPLY)).await;
}

fn analyzer(config: AnalysisConfig) -> LlmRadarAnalyzer {
    LlmRadarAnalyzer::with_config(config).expect("analyzer should build")
}

// ============================================================================
// Full runs
// ============================================================================

#[tokio::test]
async fn test_full_analysis_covers_every_area() {
    let server = MockServer::start().await;
    mount_all_areas(&server).await;

    let analysis = analyzer(analysis_config(&server))
        .run_full_analysis()
        .await
        .unwrap();

    assert_eq!(analysis.radar_date, utc_today());

    let tools: Vec<(&str, &str)> = analysis
        .trends
        .iter()
        .map(|t| (t.focus_area.as_str(), t.tool_name.as_str()))
        .collect();
    assert_eq!(
        tools,
        vec![
            ("voice_ai_ux", "LiveKit Agents"),
            ("voice_ai_ux", "VoiceHype AI"),
            ("agent_orchestration", "LangGraph"),
            ("durable_runtime", "Temporal.io"),
        ]
    );
    assert_eq!(analysis.trends[1].classification, Classification::Noise);
    assert_eq!(analysis.trends[1].noise_indicators, vec!["Marketing language only"]);
    assert!(analysis.trends[2].signal_evidence.is_empty());
}

#[tokio::test]
async fn test_failing_area_is_skipped() {
    let server = MockServer::start().await;
    mount_area(&server, "voice_ai_ux", chat_reply(VOICE_AI_REPLY)).await;
    Mock::given(method("POST"))
        .and(body_string_contains(prompt_marker("agent_orchestration")))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .expect(3)
        .mount(&server)
        .await;
    mount_area(&server, "durable_runtime", chat_reply("I could not find anything.")).await;

    let analysis = analyzer(analysis_config(&server))
        .run_full_analysis()
        .await
        .unwrap();

    assert_eq!(analysis.trends.len(), 2);
    assert!(analysis.trends.iter().all(|t| t.focus_area == "voice_ai_ux"));
}

#[tokio::test]
async fn test_transient_failure_recovers_on_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(chat_reply(DURABLE_RUNTIME_REPLY))
        .mount(&server)
        .await;

    let profile = FocusAreaProfile::for_area(FocusArea::DurableRuntime);
    let trends = analyzer(analysis_config(&server))
        .analyze_focus_area(&profile)
        .await
        .unwrap();

    assert_eq!(trends.len(), 1);
    assert_eq!(trends[0].tool_name, "Temporal.io");
    assert_eq!(trends[0].confidence_score, 95);
}

// ============================================================================
// Prompts
// ============================================================================

#[tokio::test]
async fn test_prompt_file_overrides_template() {
    let prompts = tempfile::tempdir().unwrap();
    std::fs::write(
        prompts.path().join("voice_ai_prompt.md"),
        "# Voice AI\n\n## System Prompt\nignored\n\n## User Prompt\nList voice agent frameworks as JSON.\n",
    )
    .unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("List voice agent frameworks as JSON."))
        .respond_with(chat_reply(VOICE_AI_REPLY))
        .expect(1)
        .mount(&server)
        .await;

    let config = AnalysisConfig {
        prompts_dir: prompts.path().to_path_buf(),
        ..analysis_config(&server)
    };
    let profile = FocusAreaProfile::for_area(FocusArea::VoiceAiUx);
    let trends = analyzer(config).analyze_focus_area(&profile).await.unwrap();

    assert_eq!(trends.len(), 2);
}

// ============================================================================
// Connection probe
// ============================================================================

#[tokio::test]
async fn test_check_connection_ok() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_string_contains("Say 'OK' if you can hear me."))
        .respond_with(chat_reply("OK"))
        .mount(&server)
        .await;

    let config = AnalysisConfig {
        api_key: "sk-test".to_string(),
        model: "grok-test".to_string(),
        ..analysis_config(&server)
    };
    let status = analyzer(config).check_connection().await;

    assert_eq!(status.status, ConnectionState::Ok);
    assert!(status.is_ok());
    assert_eq!(status.model, "grok-test");
}

// ============================================================================
// End-to-end refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_through_api() {
    let server = MockServer::start().await;
    mount_all_areas(&server).await;

    let state = seeded_state().with_analyzer(Arc::new(analyzer(analysis_config(&server))));
    let router = create_router(state.clone());

    let response = router
        .oneshot(
            Request::post("/api/radar/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["trends_count"], 4);

    let stored = state.repo.trends_by_date(&utc_today()).unwrap();
    assert_eq!(stored.len(), 4);
    assert!(stored.iter().all(|s| s.trend.timestamp.ends_with('Z')));
}
