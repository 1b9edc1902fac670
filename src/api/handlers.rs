//! REST API handlers for the radar server
//!
//! Routes:
//! - `GET  /`                     service info
//! - `GET  /api/health`           liveness
//! - `GET  /api/health/analysis`  analysis endpoint probe
//! - `GET  /api/radar`            trends of one radar date
//! - `GET  /api/radar/buckets`    trends of one radar date, partitioned
//! - `GET  /api/radar/board`      buckets last published by the load gate
//! - `POST /api/radar/refresh`    run an analysis and store the result
//! - `GET  /metrics`              Prometheus text format

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::analysis::ConnectionStatus;
use crate::metrics;
use crate::models::{Trend, TrendDataset, TrendRecord};
use crate::partition::{partition, BucketResult};
use crate::utils::{is_valid_radar_date, utc_today};

use super::server::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Error body, `{"success": false, "detail": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub detail: String,
}

/// Handler error carrying an HTTP status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Trends of one radar date
#[derive(Debug, Serialize, Deserialize)]
pub struct RadarResponse {
    pub radar_date: String,
    pub trends: Vec<Trend>,
}

/// Partitioned trends of one radar date
#[derive(Debug, Serialize)]
struct BucketsResponse<'a> {
    radar_date: &'a str,
    matched: usize,
    unmatched: usize,
    buckets: BucketResult<'a>,
}

/// Buckets last published by the load gate
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub publishes: u64,
    pub buckets: BTreeMap<String, Vec<TrendRecord>>,
}

/// Result of a refresh run
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub status: String,
    pub radar_date: String,
    pub trends_count: usize,
    pub message: String,
}

/// `?date=YYYY-MM-DD`, also accepted as `date_param`
#[derive(Debug, Default, Deserialize)]
pub struct RadarQuery {
    #[serde(default, alias = "date_param")]
    pub date: Option<String>,
}

impl RadarQuery {
    fn validated_date(&self) -> Result<Option<&str>, ApiError> {
        match self.date.as_deref() {
            Some(date) if !is_valid_radar_date(date) => Err(ApiError::bad_request(format!(
                "Invalid date '{date}', expected YYYY-MM-DD"
            ))),
            other => Ok(other),
        }
    }
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        // Health endpoints
        .route("/api/health", get(health_check))
        .route("/api/health/analysis", get(analysis_health_check))
        // Radar endpoints
        .route("/api/radar", get(get_radar))
        .route("/api/radar/buckets", get(get_radar_buckets))
        .route("/api/radar/board", get(get_board))
        .route("/api/radar/refresh", post(refresh_radar))
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_requests))
        .with_state(state)
}

/// Count requests and latency per matched route
async fn track_requests(req: Request, next: Next) -> Response {
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let start = Instant::now();

    let response = next.run(req).await;

    metrics::record_api_request(
        &endpoint,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

// ============================================================================
// Info and Health Handlers
// ============================================================================

async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": "Trend Radar API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "README.md",
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// Probe the analysis endpoint
async fn analysis_health_check(
    State(state): State<AppState>,
) -> Result<Json<ConnectionStatus>, ApiError> {
    let analyzer = state
        .analyzer
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("Analysis is not configured"))?;

    Ok(Json(analyzer.check_connection().await))
}

async fn metrics_handler() -> Response {
    match metrics::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => ApiError::internal(format!("Failed to encode metrics: {e}")).into_response(),
    }
}

// ============================================================================
// Radar Handlers
// ============================================================================

/// Resolve the radar date and load its trends
///
/// Without a requested date the latest stored date is used; an empty store
/// yields today's date and no trends.
fn load_radar(state: &AppState, requested: Option<&str>) -> Result<RadarResponse, ApiError> {
    let radar_date = match requested {
        Some(date) => Some(date.to_string()),
        None => state
            .repo
            .latest_radar_date()
            .map_err(|e| ApiError::internal(format!("Failed to read radar data: {e:#}")))?,
    };

    let Some(radar_date) = radar_date else {
        return Ok(RadarResponse {
            radar_date: utc_today(),
            trends: Vec::new(),
        });
    };

    let trends = state
        .repo
        .trends_by_date(&radar_date)
        .map_err(|e| ApiError::internal(format!("Failed to read radar data: {e:#}")))?
        .into_iter()
        .map(|stored| stored.trend)
        .collect();

    Ok(RadarResponse { radar_date, trends })
}

/// Get radar analysis for a date (latest when omitted)
async fn get_radar(
    State(state): State<AppState>,
    Query(query): Query<RadarQuery>,
) -> Result<Json<RadarResponse>, ApiError> {
    let date = query.validated_date()?;
    Ok(Json(load_radar(&state, date)?))
}

/// Get radar trends grouped by the configured taxonomy
async fn get_radar_buckets(
    State(state): State<AppState>,
    Query(query): Query<RadarQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = query.validated_date()?;
    let radar = load_radar(&state, date)?;

    let dataset = TrendDataset::from_trends(radar.radar_date, radar.trends);
    let records = dataset.trends.as_deref().unwrap_or_default();
    let result = partition(records, &state.taxonomy);

    let body = BucketsResponse {
        radar_date: dataset.radar_date.as_deref().unwrap_or_default(),
        matched: result.matched(),
        unmatched: result.unmatched(),
        buckets: result,
    };

    serde_json::to_value(&body)
        .map(Json)
        .map_err(|e| ApiError::internal(format!("Failed to encode buckets: {e}")))
}

/// Buckets currently held by the board
async fn get_board(State(state): State<AppState>) -> Json<BoardResponse> {
    Json(BoardResponse {
        publishes: state.board.publish_count(),
        buckets: state.board.snapshot(),
    })
}

/// Run a new analysis and replace that date's trends
async fn refresh_radar(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let analyzer = state
        .analyzer
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("Analysis is not configured"))?;

    let analysis = analyzer.run_full_analysis().await.map_err(|e| {
        metrics::record_refresh("error", 0);
        tracing::error!(error = %e, "Radar refresh failed");
        ApiError::internal(format!("Failed to refresh radar data: {e}"))
    })?;

    if analysis.trends.is_empty() {
        metrics::record_refresh("warning", 0);
        tracing::warn!(radar_date = %analysis.radar_date, "Analysis returned no trends");
        return Ok(Json(RefreshResponse {
            status: "warning".to_string(),
            radar_date: analysis.radar_date,
            trends_count: 0,
            message: "Analysis completed but no trends discovered. Check API key configuration."
                .to_string(),
        }));
    }

    let stored = state
        .repo
        .replace_radar(&analysis.radar_date, &analysis.trends)
        .map_err(|e| {
            metrics::record_refresh("error", 0);
            tracing::error!(error = %e, "Failed to store refreshed radar");
            ApiError::internal(format!("Failed to refresh radar data: {e:#}"))
        })?;

    metrics::record_refresh("success", stored);
    let skipped = analysis.trends.len().saturating_sub(stored);
    if skipped > 0 {
        tracing::warn!(skipped, "Duplicate trends in analysis were not stored");
    }
    tracing::info!(radar_date = %analysis.radar_date, stored, "Radar refreshed");

    // The board shows what the store holds, not the raw analysis
    let radar = load_radar(&state, Some(analysis.radar_date.as_str()))?;
    state
        .datasets
        .replace(TrendDataset::from_trends(radar.radar_date.clone(), radar.trends));

    Ok(Json(RefreshResponse {
        status: "success".to_string(),
        radar_date: radar.radar_date,
        trends_count: stored,
        message: format!("Successfully analyzed and stored {stored} trends."),
    }))
}

// ============================================================================
// Tests
// ============================================================================
