//! Trend persistence
//!
//! SQLite holds every radar run keyed by date. The [`TrendRepository`] trait
//! keeps the API and CLI independent of the backend.

pub mod repository;
pub mod seed;

use anyhow::Result;

use crate::config::DatabaseConfig;

pub use repository::{
    create_mock_repository, create_sqlite_repository, MockTrendRepository, SharedTrendRepository,
    SqliteTrendRepository, StoredTrend, TrendRepository,
};
pub use seed::{seed, seed_trends, SEED_DATE};

/// Open the repository described by the database configuration
///
/// The path `:memory:` opens a private in-memory database.
pub fn open_repository(config: &DatabaseConfig) -> Result<SharedTrendRepository> {
    if config.path.as_os_str() == ":memory:" {
        return Ok(std::sync::Arc::new(SqliteTrendRepository::in_memory()?));
    }

    create_sqlite_repository(&config.path)
}
