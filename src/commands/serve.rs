use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use trendradar::analysis::LlmRadarAnalyzer;
use trendradar::api::{AppState, RadarServer};
use trendradar::config::Config;
use trendradar::metrics;
use trendradar::storage::{self, open_repository};

/// Options of the `serve` command
#[derive(Debug, Clone, Default)]
pub struct ServeParams {
    pub bind: Option<SocketAddr>,
    pub seed: bool,
}

/// Start the radar API server
pub async fn serve(config: Config, params: ServeParams) -> Result<()> {
    if let Err(e) = metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics disabled");
    }

    let repo = open_repository(&config.database)
        .with_context(|| format!("Failed to open {}", config.database.path.display()))?;

    if params.seed {
        storage::seed(repo.as_ref()).context("Failed to seed database")?;
    }

    let taxonomy = Arc::new(config.taxonomy().context("Invalid taxonomy configuration")?);
    let analyzer = LlmRadarAnalyzer::with_config(config.analysis.clone())?;
    let state = AppState::new(repo, taxonomy).with_analyzer(Arc::new(analyzer));

    let mut server_config = config.server.clone();
    if let Some(bind) = params.bind {
        server_config.bind_address = bind;
    }

    let server = RadarServer::new(server_config, state)?;
    println!("{}", server.info().display());

    server.start_with_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// Insert the sample radar
pub async fn seed(config: Config) -> Result<()> {
    let repo = open_repository(&config.database)
        .with_context(|| format!("Failed to open {}", config.database.path.display()))?;

    let inserted = storage::seed(repo.as_ref())?;
    println!(
        "Seeded {inserted} trends for {} ({} stored in total)",
        storage::SEED_DATE,
        repo.count()?
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
