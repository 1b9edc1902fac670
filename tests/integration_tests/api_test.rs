//! HTTP API integration tests
//!
//! Exercises the full router as the server builds it: CORS, refresh,
//! the board fed by the load gate and the metrics endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use trendradar::api::{AppState, RadarServer};
use trendradar::config::ServerConfig;
use trendradar::models::Classification;
use trendradar::storage::SEED_DATE;

use super::fixtures::{json_tool_names, seeded_state, trend, FailingAnalyzer, StubAnalyzer};

const REFRESH_DATE: &str = "2026-02-01";

fn server(state: AppState) -> RadarServer {
    RadarServer::new(ServerConfig::default(), state).expect("valid server config")
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(router: Router, uri: &str) -> (StatusCode, Value) {
    send(router, Request::post(uri).body(Body::empty()).unwrap()).await
}

fn refreshed_trends() -> Vec<trendradar::models::Trend> {
    vec![
        trend("voice_ai_ux", "Pipecat", Classification::Signal),
        trend("agent_orchestration", "CrewAI", Classification::Noise),
        trend("durable_runtime", "Restate", Classification::Signal),
    ]
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let router = server(seeded_state()).build_router();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/radar")
        .header(header::ORIGIN, "http://localhost:8080")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:8080"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_ignores_unknown_origin() {
    let router = server(seeded_state()).build_router();
    let request = Request::get("/api/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

// ============================================================================
// Radar endpoints
// ============================================================================

#[tokio::test]
async fn test_root_reports_service() {
    let router = server(seeded_state()).build_router();
    let (status, body) = get(router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Trend Radar API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_buckets_for_unknown_date_are_empty() {
    let router = server(seeded_state()).build_router();
    let (status, body) = get(router, "/api/radar/buckets?date=2020-01-01").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["radar_date"], "2020-01-01");
    assert_eq!(body["matched"], 0);
    let buckets = body["buckets"].as_object().unwrap();
    assert_eq!(buckets.len(), 6);
    assert!(buckets.values().all(|items| items.as_array().unwrap().is_empty()));
}

#[tokio::test]
async fn test_buckets_keep_taxonomy_order() {
    let router = server(seeded_state()).build_router();
    let (_, body) = get(router, &format!("/api/radar/buckets?date={SEED_DATE}")).await;

    let keys: Vec<&String> = body["buckets"].as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 6);
    assert_eq!(
        json_tool_names(&body["buckets"]["durableRuntimeSignals"]),
        vec!["Temporal.io"]
    );
}

#[tokio::test]
async fn test_analysis_health_without_analyzer() {
    let router = server(seeded_state()).build_router();
    let (status, body) = get(router, "/api/health/analysis").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_analysis_health_with_analyzer() {
    let state = seeded_state().with_analyzer(StubAnalyzer::new(REFRESH_DATE, vec![]));
    let (status, body) = get(server(state).build_router(), "/api/health/analysis").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "stub-model");
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_stores_and_serves_new_radar() {
    let analyzer = StubAnalyzer::new(REFRESH_DATE, refreshed_trends());
    let state = seeded_state().with_analyzer(analyzer.clone());
    let router = server(state.clone()).build_router();

    let (status, body) = post(router.clone(), "/api/radar/refresh").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["radar_date"], REFRESH_DATE);
    assert_eq!(body["trends_count"], 3);
    assert_eq!(analyzer.runs(), 1);

    let (_, radar) = get(router.clone(), "/api/radar").await;
    assert_eq!(radar["radar_date"], REFRESH_DATE);
    assert_eq!(
        json_tool_names(&radar["trends"]),
        vec!["Pipecat", "CrewAI", "Restate"]
    );

    // The seeded radar is still available by date
    let (_, seeded) = get(router, &format!("/api/radar?date={SEED_DATE}")).await;
    assert_eq!(seeded["trends"].as_array().unwrap().len(), 6);

    let dataset = state.datasets.current().unwrap();
    assert_eq!(dataset.radar_date.as_deref(), Some(REFRESH_DATE));
    assert_eq!(dataset.len(), 3);
}

#[tokio::test]
async fn test_refresh_twice_replaces_the_date() {
    let analyzer = StubAnalyzer::new(REFRESH_DATE, refreshed_trends());
    let state = seeded_state().with_analyzer(analyzer.clone());
    let router = server(state.clone()).build_router();

    post(router.clone(), "/api/radar/refresh").await;
    post(router.clone(), "/api/radar/refresh").await;

    let stored = state.repo.trends_by_date(REFRESH_DATE).unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(analyzer.runs(), 2);
}

#[tokio::test]
async fn test_refresh_reports_stored_rows_for_duplicate_trends() {
    let duplicated = vec![
        trend("voice_ai_ux", "Pipecat", Classification::Signal),
        trend("voice_ai_ux", "Pipecat", Classification::Signal),
        trend("durable_runtime", "Restate", Classification::Signal),
    ];
    let state = seeded_state().with_analyzer(StubAnalyzer::new(REFRESH_DATE, duplicated));
    let router = server(state.clone()).build_router();

    let (status, body) = post(router, "/api/radar/refresh").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["trends_count"], 2);
    assert_eq!(body["message"], "Successfully analyzed and stored 2 trends.");
    assert_eq!(state.repo.trends_by_date(REFRESH_DATE).unwrap().len(), 2);

    let dataset = state.datasets.current().unwrap();
    let names: Vec<&str> = dataset
        .trends
        .as_deref()
        .unwrap()
        .iter()
        .filter_map(|r| r.tool_name())
        .collect();
    assert_eq!(names, vec!["Pipecat", "Restate"]);
}

#[tokio::test]
async fn test_refresh_without_trends_warns() {
    let state = seeded_state().with_analyzer(StubAnalyzer::new(REFRESH_DATE, vec![]));
    let router = server(state.clone()).build_router();

    let (status, body) = post(router, "/api/radar/refresh").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "warning");
    assert_eq!(body["trends_count"], 0);
    assert!(body["message"].as_str().unwrap().contains("no trends discovered"));
    assert!(state.repo.trends_by_date(REFRESH_DATE).unwrap().is_empty());
    assert!(state.datasets.current().is_none());
}

#[tokio::test]
async fn test_refresh_failure_is_server_error() {
    let state = seeded_state().with_analyzer(Arc::new(FailingAnalyzer));
    let router = server(state).build_router();

    let (status, body) = post(router, "/api/radar/refresh").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Failed to refresh radar data"));
    assert!(detail.contains("upstream unavailable"));
}

// ============================================================================
// Board
// ============================================================================

async fn wait_for_publishes(state: &AppState, count: u64) {
    for _ in 0..100 {
        if state.board.publish_count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "board reached {} publishes, expected {count}",
        state.board.publish_count()
    );
}

#[tokio::test]
async fn test_board_follows_refresh() {
    let analyzer = StubAnalyzer::new(REFRESH_DATE, refreshed_trends());
    let state = seeded_state().with_analyzer(analyzer);
    let server = server(state.clone());
    let gate = server.start_load_gate().unwrap();
    let router = server.build_router();

    wait_for_publishes(&state, 6).await;
    let (_, board) = get(router.clone(), "/api/radar/board").await;
    assert_eq!(json_tool_names(&board["buckets"]["voiceAiSignals"]), vec!["LiveKit Agents"]);

    post(router.clone(), "/api/radar/refresh").await;
    wait_for_publishes(&state, 12).await;

    let (status, board) = get(router, "/api/radar/board").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["publishes"], 12);
    assert_eq!(json_tool_names(&board["buckets"]["voiceAiSignals"]), vec!["Pipecat"]);
    assert_eq!(json_tool_names(&board["buckets"]["agentOrchNoise"]), vec!["CrewAI"]);
    assert!(json_tool_names(&board["buckets"]["voiceAiNoise"]).is_empty());

    gate.abort();
}

// ============================================================================
// Metrics
// ============================================================================

#[tokio::test]
async fn test_metrics_endpoint_counts_requests() {
    trendradar::metrics::init_metrics().unwrap();
    let router = server(seeded_state()).build_router();

    let (status, _) = get(router.clone(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);

    let response = router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("trendradar_api_requests_total"));
    assert!(text.contains("/api/health"));
}
