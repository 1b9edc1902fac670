//! Repository Pattern for Trend Storage
//!
//! Trait-based repository so the API and CLI do not depend on SQLite
//! directly:
//! - `SqliteTrendRepository` for production
//! - `MockTrendRepository` for tests
//!
//! # Usage
//!
//! ```rust,ignore
//! use trendradar::storage::{SqliteTrendRepository, TrendRepository};
//!
//! let repo = SqliteTrendRepository::new("radar.db")?;
//! let latest = repo.latest_trends()?;
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use anyhow::{anyhow, Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{Classification, Trend, UnknownClassification};

// ============================================================================
// Core Types
// ============================================================================

/// A trend row with its storage identity
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTrend {
    pub id: i64,
    pub radar_date: String,
    pub trend: Trend,
}

// ============================================================================
// Repository Trait
// ============================================================================

/// Repository for radar trends
///
/// `(radar_date, focus_area, tool_name)` is unique. Query results are in
/// insertion order.
pub trait TrendRepository: Send + Sync {
    /// Insert one trend; returns `false` if the unique key already exists
    fn insert(&self, radar_date: &str, trend: &Trend) -> Result<bool>;

    /// Replace every trend of `radar_date` with `trends` atomically
    fn replace_radar(&self, radar_date: &str, trends: &[Trend]) -> Result<usize>;

    /// Trends for one radar date
    fn trends_by_date(&self, radar_date: &str) -> Result<Vec<StoredTrend>>;

    /// Trends for one focus area, across dates
    fn trends_by_focus_area(&self, focus_area: &str) -> Result<Vec<StoredTrend>>;

    /// Trends with one classification, across dates
    fn trends_by_classification(&self, classification: Classification)
        -> Result<Vec<StoredTrend>>;

    /// Most recent radar date present
    fn latest_radar_date(&self) -> Result<Option<String>>;

    /// Trends of the most recent radar date
    fn latest_trends(&self) -> Result<Vec<StoredTrend>> {
        match self.latest_radar_date()? {
            Some(date) => self.trends_by_date(&date),
            None => Ok(Vec::new()),
        }
    }

    /// Every stored trend
    fn all_trends(&self) -> Result<Vec<StoredTrend>>;

    /// Number of stored trends
    fn count(&self) -> Result<usize>;
}

// ============================================================================
// SQLite Implementation
// ============================================================================

const SELECT_COLUMNS: &str = "SELECT id, radar_date, focus_area, tool_name, classification,
        confidence_score, technical_insight, signal_evidence, noise_indicators,
        architectural_verdict, timestamp
     FROM trends";

/// SQLite implementation of TrendRepository
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteTrendRepository {
    conn: Mutex<Connection>,
}

impl SqliteTrendRepository {
    /// Open (or create) a database file
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite trend repository initialized");
        Ok(repo)
    }

    /// Create in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory SQLite")?;
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;
        Ok(repo)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection mutex poisoned"))
    }

    fn create_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS trends (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    radar_date TEXT NOT NULL,
                    focus_area TEXT NOT NULL,
                    tool_name TEXT NOT NULL,
                    classification TEXT NOT NULL
                        CHECK (classification IN ('signal', 'noise')),
                    confidence_score INTEGER NOT NULL,
                    technical_insight TEXT NOT NULL,
                    signal_evidence TEXT,
                    noise_indicators TEXT,
                    architectural_verdict INTEGER NOT NULL,
                    timestamp TEXT NOT NULL,
                    CONSTRAINT uq_trend_date_area_tool
                        UNIQUE (radar_date, focus_area, tool_name)
                );

                CREATE INDEX IF NOT EXISTS idx_trends_radar_date
                    ON trends(radar_date);

                CREATE INDEX IF NOT EXISTS idx_trends_focus_area
                    ON trends(focus_area);
                "#,
        )
        .context("Failed to create SQLite schema")?;

        Ok(())
    }

    fn insert_with(conn: &Connection, radar_date: &str, trend: &Trend) -> Result<bool> {
        let changed = conn
            .execute(
                r#"
                INSERT OR IGNORE INTO trends (
                    radar_date, focus_area, tool_name, classification, confidence_score,
                    technical_insight, signal_evidence, noise_indicators,
                    architectural_verdict, timestamp
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    radar_date,
                    trend.focus_area,
                    trend.tool_name,
                    trend.classification.as_str(),
                    trend.confidence_score,
                    trend.technical_insight,
                    serde_json::to_string(&trend.signal_evidence)?,
                    serde_json::to_string(&trend.noise_indicators)?,
                    trend.architectural_verdict,
                    trend.timestamp,
                ],
            )
            .context("Failed to insert trend")?;

        Ok(changed > 0)
    }

    fn query(&self, filter: &str, param: &str) -> Result<Vec<StoredTrend>> {
        let conn = self.conn()?;
        let sql = format!("{SELECT_COLUMNS} {filter} ORDER BY id");
        let mut stmt = conn.prepare(&sql).context("Failed to prepare trend query")?;

        let rows = if filter.is_empty() {
            stmt.query_map([], row_to_stored)?
                .collect::<rusqlite::Result<Vec<_>>>()
        } else {
            stmt.query_map(params![param], row_to_stored)?
                .collect::<rusqlite::Result<Vec<_>>>()
        };

        rows.context("Failed to read trend rows")
    }
}

fn row_to_stored(row: &Row<'_>) -> rusqlite::Result<StoredTrend> {
    let classification: String = row.get(4)?;
    let classification = Classification::parse(&classification).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            Box::new(UnknownClassification(classification.clone())),
        )
    })?;

    let signal_evidence: Option<String> = row.get(7)?;
    let noise_indicators: Option<String> = row.get(8)?;

    Ok(StoredTrend {
        id: row.get(0)?,
        radar_date: row.get(1)?,
        trend: Trend {
            focus_area: row.get(2)?,
            tool_name: row.get(3)?,
            classification,
            confidence_score: row.get(5)?,
            technical_insight: row.get(6)?,
            signal_evidence: decode_list(signal_evidence),
            noise_indicators: decode_list(noise_indicators),
            architectural_verdict: row.get(9)?,
            timestamp: row.get(10)?,
        },
    })
}

// Evidence columns hold a JSON array or NULL.
fn decode_list(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

impl TrendRepository for SqliteTrendRepository {
    fn insert(&self, radar_date: &str, trend: &Trend) -> Result<bool> {
        let conn = self.conn()?;
        Self::insert_with(&conn, radar_date, trend)
    }

    fn replace_radar(&self, radar_date: &str, trends: &[Trend]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().context("Failed to begin transaction")?;

        let removed = tx
            .execute("DELETE FROM trends WHERE radar_date = ?1", params![radar_date])
            .context("Failed to delete previous radar")?;

        let mut inserted = 0;
        for trend in trends {
            if Self::insert_with(&tx, radar_date, trend)? {
                inserted += 1;
            }
        }

        tx.commit().context("Failed to commit radar replacement")?;

        tracing::info!(radar_date, removed, inserted, "Radar trends replaced");
        Ok(inserted)
    }

    fn trends_by_date(&self, radar_date: &str) -> Result<Vec<StoredTrend>> {
        self.query("WHERE radar_date = ?1", radar_date)
    }

    fn trends_by_focus_area(&self, focus_area: &str) -> Result<Vec<StoredTrend>> {
        self.query("WHERE focus_area = ?1", focus_area)
    }

    fn trends_by_classification(
        &self,
        classification: Classification,
    ) -> Result<Vec<StoredTrend>> {
        self.query("WHERE classification = ?1", classification.as_str())
    }

    fn latest_radar_date(&self) -> Result<Option<String>> {
        let conn = self.conn()?;
        let date = conn
            .query_row(
                "SELECT radar_date FROM trends ORDER BY radar_date DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query latest radar date")?;

        Ok(date)
    }

    fn all_trends(&self) -> Result<Vec<StoredTrend>> {
        self.query("", "")
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM trends", [], |row| row.get(0))?;
        Ok(total as usize)
    }
}

// ============================================================================
// Mock Implementation (for testing)
// ============================================================================

/// In-memory mock implementation of TrendRepository
#[derive(Default)]
pub struct MockTrendRepository {
    rows: RwLock<Vec<StoredTrend>>,
}

impl MockTrendRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<StoredTrend>>> {
        self.rows.read().map_err(|_| anyhow!("mock repository lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<StoredTrend>>> {
        self.rows.write().map_err(|_| anyhow!("mock repository lock poisoned"))
    }

    fn filtered(&self, keep: impl Fn(&StoredTrend) -> bool) -> Result<Vec<StoredTrend>> {
        Ok(self.read()?.iter().filter(|r| keep(r)).cloned().collect())
    }

    fn push(rows: &mut Vec<StoredTrend>, radar_date: &str, trend: &Trend) -> bool {
        let exists = rows.iter().any(|r| {
            r.radar_date == radar_date
                && r.trend.focus_area == trend.focus_area
                && r.trend.tool_name == trend.tool_name
        });
        if exists {
            return false;
        }

        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        rows.push(StoredTrend {
            id,
            radar_date: radar_date.to_string(),
            trend: trend.clone(),
        });
        true
    }
}

impl TrendRepository for MockTrendRepository {
    fn insert(&self, radar_date: &str, trend: &Trend) -> Result<bool> {
        let mut rows = self.write()?;
        Ok(Self::push(&mut rows, radar_date, trend))
    }

    fn replace_radar(&self, radar_date: &str, trends: &[Trend]) -> Result<usize> {
        let mut rows = self.write()?;
        rows.retain(|r| r.radar_date != radar_date);
        Ok(trends
            .iter()
            .filter(|t| Self::push(&mut rows, radar_date, t))
            .count())
    }

    fn trends_by_date(&self, radar_date: &str) -> Result<Vec<StoredTrend>> {
        self.filtered(|r| r.radar_date == radar_date)
    }

    fn trends_by_focus_area(&self, focus_area: &str) -> Result<Vec<StoredTrend>> {
        self.filtered(|r| r.trend.focus_area == focus_area)
    }

    fn trends_by_classification(
        &self,
        classification: Classification,
    ) -> Result<Vec<StoredTrend>> {
        self.filtered(|r| r.trend.classification == classification)
    }

    fn latest_radar_date(&self) -> Result<Option<String>> {
        Ok(self.read()?.iter().map(|r| r.radar_date.clone()).max())
    }

    fn all_trends(&self) -> Result<Vec<StoredTrend>> {
        self.filtered(|_| true)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}

// ============================================================================
// Shared Repository Types
// ============================================================================

/// Thread-safe shared repository wrapper
pub type SharedTrendRepository = Arc<dyn TrendRepository>;

/// Create a shared SQLite repository
pub fn create_sqlite_repository(path: impl AsRef<Path>) -> Result<SharedTrendRepository> {
    Ok(Arc::new(SqliteTrendRepository::new(path)?))
}

/// Create a shared mock repository
pub fn create_mock_repository() -> SharedTrendRepository {
    Arc::new(MockTrendRepository::new())
}

// ============================================================================
// Tests
// ============================================================================
