//! Radar server implementation
//!
//! Wires the trend store, the analyzer and the load gate behind the HTTP
//! router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::http::HeaderValue;
use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::analysis::RadarAnalyzer;
use crate::config::ServerConfig;
use crate::loader::{dataset_from_repository, BucketBoard, DatasetStore, LoadGate};
use crate::partition::Taxonomy;
use crate::storage::SharedTrendRepository;

use super::handlers::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Trend store
    pub repo: SharedTrendRepository,

    /// Analyzer used by refresh; refresh answers 503 without one
    pub analyzer: Option<Arc<dyn RadarAnalyzer>>,

    /// Bucket configuration
    pub taxonomy: Arc<Taxonomy>,

    /// Dataset watched by the load gate
    pub datasets: DatasetStore,

    /// Buckets published by the load gate
    pub board: BucketBoard,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(repo: SharedTrendRepository, taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            repo,
            analyzer: None,
            taxonomy,
            datasets: DatasetStore::new(),
            board: BucketBoard::new(),
            start_time: Instant::now(),
        }
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn RadarAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }
}

// ============================================================================
// Radar Server
// ============================================================================

/// Main radar server
pub struct RadarServer {
    config: ServerConfig,
    origins: Vec<HeaderValue>,
    state: AppState,
}

impl RadarServer {
    /// Create a new radar server
    pub fn new(config: ServerConfig, state: AppState) -> Result<Self, ServerError> {
        let origins = config
            .cors_origins
            .iter()
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|e| {
                    ServerError::ConfigError(format!("Invalid CORS origin {origin}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            origins,
            state,
        })
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if !self.origins.is_empty() {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(self.origins.clone())
                    .allow_methods(AllowMethods::mirror_request())
                    .allow_headers(AllowHeaders::mirror_request())
                    .allow_credentials(true),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Load the latest stored radar and start the load gate
    ///
    /// The gate republishes into the board whenever the dataset store is
    /// replaced, e.g. after a refresh.
    pub fn start_load_gate(&self) -> Result<JoinHandle<u64>, ServerError> {
        let state = &self.state;
        let gate = LoadGate::new(
            state.taxonomy.clone(),
            state.datasets.clone(),
            state.board.clone(),
        );
        let ready = gate.on_ready(state.datasets.notifier());

        let dataset = dataset_from_repository(state.repo.as_ref(), None)
            .map_err(|e| ServerError::InitError(format!("{e:#}")))?;
        state.datasets.replace(dataset);

        tracing::debug!(eager = ready.eager_outcome().as_str(), "Load gate registered");
        Ok(tokio::spawn(ready.run()))
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        let gate = self.start_load_gate()?;

        tracing::info!(%addr, "Starting radar server");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()));

        gate.abort();
        served?;

        tracing::info!("Radar server shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address,
            cors_origins: self.config.cors_origins.clone(),
            buckets: self.state.taxonomy.len(),
            analysis_enabled: self.state.analyzer.is_some(),
            request_logging_enabled: self.config.enable_request_logging,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub cors_origins: Vec<String>,
    pub buckets: usize,
    pub analysis_enabled: bool,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Radar Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             CORS Origins: {}\n\
             Buckets: {}\n\
             Analysis: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            self.cors_origins.join(", "),
            self.buckets,
            if self.analysis_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Initialization error
    InitError(String),

    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::InitError(msg) => write!(f, "Initialization error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

// ============================================================================
// Tests
// ============================================================================
