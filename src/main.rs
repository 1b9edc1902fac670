use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendradar::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "trendradar",
    version,
    about = "Signal vs noise radar for emerging developer tools",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file; environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the radar API server
    Serve {
        /// Address to bind to (overrides configuration)
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Insert the sample radar before serving
        #[arg(long, default_value = "false")]
        seed: bool,
    },

    /// Insert the sample radar into the database
    Seed,

    /// Partition a radar into buckets and print them
    Radar {
        /// Radar date (YYYY-MM-DD); latest when omitted
        #[arg(short, long, conflicts_with = "file")]
        date: Option<String>,

        /// Read the radar from a JSON file
        #[arg(short, long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// Read the radar from a running server (base URL)
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Run a new analysis and store the results
    Refresh,

    /// Check the analysis endpoint connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    tracing::debug!("trendradar starting");

    match cli.command {
        Commands::Serve { bind, seed } => {
            tracing::info!(bind = ?bind, seed = %seed, "Starting serve command");
            commands::serve(config, commands::ServeParams { bind, seed }).await?;
        }

        Commands::Seed => {
            commands::seed(config).await?;
        }

        Commands::Radar { date, file, url } => {
            tracing::debug!(date = ?date, file = ?file, url = ?url, "Starting radar command");
            commands::radar(config, commands::RadarParams { date, file, url }).await?;
        }

        Commands::Refresh => {
            tracing::info!("Starting refresh command");
            commands::refresh(config).await?;
        }

        Commands::Check => {
            commands::check(config).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("trendradar=debug,tower_http=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("trendradar={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
