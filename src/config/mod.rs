//! Configuration management for the trend radar
//!
//! Configuration comes from environment variables or a TOML file. Every
//! section has defaults suitable for a local development setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisConfig;
use crate::partition::{Taxonomy, TaxonomyEntry, TaxonomyError};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_DATABASE_PATH: &str = "radar.db";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP API configuration
    pub server: ServerConfig,

    /// Trend store configuration
    pub database: DatabaseConfig,

    /// Analysis client configuration
    pub analysis: AnalysisConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Bucket taxonomy override; the six radar buckets when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<Vec<TaxonomyEntry>>,
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,

    /// Allowed CORS origins
    pub cors_origins: Vec<String>,

    /// Enable request logging
    pub enable_request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            enable_request_logging: true,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database path, `:memory:` for an in-memory store
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

/// Accept both a plain path and a `sqlite:///path` URL
fn database_path_from_url(url: &str) -> PathBuf {
    let path = url
        .strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .unwrap_or(url);
    PathBuf::from(path)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bind_address = std::env::var("RADAR_BIND_ADDRESS")
            .unwrap_or_else(|_| String::from(DEFAULT_BIND_ADDRESS));
        let bind_address: SocketAddr = bind_address
            .parse()
            .with_context(|| format!("Invalid RADAR_BIND_ADDRESS: {bind_address}"))?;

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec![DEFAULT_CORS_ORIGIN.to_string()]);

        let path = std::env::var("RADAR_DATABASE_PATH")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("RADAR_DATABASE_URL").map(|url| database_path_from_url(&url)))
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATABASE_PATH));

        let log_level = std::env::var("RADAR_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format = std::env::var("RADAR_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            server: ServerConfig {
                bind_address,
                cors_origins,
                enable_request_logging: true,
            },
            database: DatabaseConfig { path },
            analysis: AnalysisConfig::from_env(),
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
            taxonomy: None,
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.cors_origins.iter().any(|o| o == "*") {
            anyhow::bail!("cors_origins must list explicit origins, not '*'");
        }

        if self.database.path.as_os_str().is_empty() {
            anyhow::bail!("database path must not be empty");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("log format must be 'text' or 'json'");
        }

        self.analysis.validate()?;

        self.taxonomy().context("Invalid taxonomy configuration")?;

        Ok(())
    }

    /// Build the configured taxonomy
    pub fn taxonomy(&self) -> std::result::Result<Taxonomy, TaxonomyError> {
        match &self.taxonomy {
            Some(entries) => Taxonomy::new(entries.clone()),
            None => Ok(Taxonomy::radar_default()),
        }
    }
}
