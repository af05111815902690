use super::{RawRecord, RecordSource, FIELD_COUNT, FIELD_NAMES};
use crate::config::DatabaseConfig;
use crate::database::{open_read_only_pool, Database};
use crate::error::LoadError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};
use std::path::{Path, PathBuf};

const SELECT_ALL: &str = "SELECT * FROM data ORDER BY time";

/// History store kept in a SQLite database.
///
/// The `data` table holds the same eight columns as the CSV files, in the
/// same order. Column types are not fixed: a table built by `.import` is all
/// TEXT, prices may be REAL, and an empty or NULL price means the grade is
/// not sold.
pub struct SqliteSource {
    path: PathBuf,
    database: Database,
}

impl SqliteSource {
    /// Open a read-only pool on the database at `path`
    pub async fn open(path: impl AsRef<Path>, config: &DatabaseConfig) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let pool = open_read_only_pool(&path, config)
            .await
            .map_err(|e| LoadError::unavailable(path.display().to_string(), e))?;

        Ok(Self {
            path,
            database: Database::new(pool),
        })
    }

    fn convert_row(&self, row: usize, sql_row: &SqliteRow) -> Result<RawRecord, LoadError> {
        let mut fields: [String; FIELD_COUNT] = Default::default();
        for (index, field) in fields.iter_mut().enumerate() {
            *field = column_text(sql_row, index).map_err(|reason| LoadError::MalformedRecord {
                origin: self.describe(),
                row,
                field: FIELD_NAMES[index],
                reason,
            })?;
        }
        Ok(RawRecord::new(row, fields))
    }
}

/// Text form of a column, whatever storage class SQLite used for it.
///
/// NULL becomes an empty field. Numeric parsing is left to the loader so
/// SQLite and CSV rows are validated the same way.
fn column_text(sql_row: &SqliteRow, index: usize) -> Result<String, String> {
    let raw = sql_row.try_get_raw(index).map_err(|e| e.to_string())?;
    if raw.is_null() {
        return Ok(String::new());
    }
    let storage = raw.type_info().name().to_string();

    let text: Result<String, sqlx::Error> = match storage.as_str() {
        "INTEGER" => sql_row.try_get_unchecked(index).map(|v: i64| v.to_string()),
        "REAL" => sql_row.try_get_unchecked(index).map(|v: f64| v.to_string()),
        "TEXT" => sql_row.try_get_unchecked(index),
        other => return Err(format!("unsupported column type {}", other)),
    };
    text.map_err(|e| e.to_string())
}

#[async_trait]
impl RecordSource for SqliteSource {
    async fn read_rows(&self) -> Result<Vec<RawRecord>, LoadError> {
        let rows = sqlx::query(SELECT_ALL)
            .fetch_all(self.database.pool())
            .await
            .map_err(|e| LoadError::unavailable(self.describe(), format!("failed to query db: {}", e)))?;

        if let Some(first) = rows.first() {
            if first.len() < FIELD_COUNT {
                return Err(LoadError::MalformedRecord {
                    origin: self.describe(),
                    row: 1,
                    field: "record",
                    reason: format!("expected {} columns, found {}", FIELD_COUNT, first.len()),
                });
            }
        }

        rows.iter()
            .enumerate()
            .map(|(index, row)| self.convert_row(index + 1, row))
            .collect()
    }

    async fn last_modified(&self) -> Result<DateTime<Utc>, LoadError> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| LoadError::unavailable(self.describe(), format!("failed to stat: {}", e)))?;
        let modified = metadata
            .modified()
            .map_err(|e| LoadError::unavailable(self.describe(), format!("failed to stat: {}", e)))?;
        Ok(DateTime::<Utc>::from(modified))
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}
