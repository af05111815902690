//! Readers that turn an external data source into raw 8-field rows.
//!
//! The loader only sees [`RawRecord`]s; whether they came from a flat file or
//! a database query is hidden behind [`RecordSource`].

pub mod csv_source;
pub mod sqlite_source;

pub use csv_source::CsvSource;
pub use sqlite_source::SqliteSource;

use crate::config::DatabaseConfig;
use crate::error::LoadError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

/// Number of ordered fields in every row
pub const FIELD_COUNT: usize = 8;

/// Field names, in row order
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "timestamp",
    "station_id",
    "name",
    "latitude",
    "longitude",
    "regular_price",
    "premium_price",
    "diesel_price",
];

/// One unparsed row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based position of the row in its source
    pub row: usize,
    pub fields: [String; FIELD_COUNT],
}

impl RawRecord {
    pub fn new(row: usize, fields: [String; FIELD_COUNT]) -> Self {
        Self { row, fields }
    }
}

/// A source of price rows
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Read every row. Fails as a whole; never returns a partial read.
    async fn read_rows(&self) -> Result<Vec<RawRecord>, LoadError>;

    /// Last modification instant of the underlying data
    async fn last_modified(&self) -> Result<DateTime<Utc>, LoadError>;

    /// Human readable name used in logs and errors
    fn describe(&self) -> String;
}

/// Returns true when the path names a SQLite database
pub fn is_sqlite_path(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref(),
        Some("db" | "sqlite" | "sqlite3")
    )
}

/// Build the source for a path: SQLite for `.db`/`.sqlite`/`.sqlite3`, CSV otherwise
pub async fn source_for_path(
    path: &Path,
    database: &DatabaseConfig,
) -> Result<Arc<dyn RecordSource>, LoadError> {
    if is_sqlite_path(path) {
        let source = SqliteSource::open(path, database).await?;
        Ok(Arc::new(source))
    } else {
        Ok(Arc::new(CsvSource::new(path)))
    }
}
