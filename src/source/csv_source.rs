use super::{RawRecord, RecordSource, FIELD_COUNT};
use crate::error::LoadError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Headerless CSV file with exactly eight fields per record
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_all(&self) -> Result<Vec<RawRecord>, LoadError> {
        let origin = self.describe();
        let file = File::open(&self.path)
            .map_err(|e| LoadError::unavailable(&origin, format!("failed to open data file: {}", e)))?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let row = index + 1;
            let record = result.map_err(|e| {
                if e.is_io_error() {
                    LoadError::unavailable(&origin, format!("failed to read data file: {}", e))
                } else {
                    LoadError::MalformedRecord {
                        origin: origin.clone(),
                        row,
                        field: "record",
                        reason: e.to_string(),
                    }
                }
            })?;

            let fields: Vec<String> = record.iter().map(str::to_string).collect();
            let count = fields.len();
            let fields: [String; FIELD_COUNT] =
                fields.try_into().map_err(|_| LoadError::MalformedRecord {
                    origin: origin.clone(),
                    row,
                    field: "record",
                    reason: format!("expected {} fields, found {}", FIELD_COUNT, count),
                })?;

            rows.push(RawRecord::new(row, fields));
        }

        Ok(rows)
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    async fn read_rows(&self) -> Result<Vec<RawRecord>, LoadError> {
        self.read_all()
    }

    async fn last_modified(&self) -> Result<DateTime<Utc>, LoadError> {
        let metadata = std::fs::metadata(&self.path)
            .map_err(|e| LoadError::unavailable(self.describe(), format!("failed to stat: {}", e)))?;
        let modified = metadata
            .modified()
            .map_err(|e| LoadError::unavailable(self.describe(), format!("failed to stat: {}", e)))?;
        Ok(DateTime::<Utc>::from(modified))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
