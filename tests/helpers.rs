#![allow(dead_code)]

use gastrak::http::AppState;
use gastrak::loader::build_records;
use gastrak::models::Snapshot;
use gastrak::source::{CsvSource, RawRecord, RecordSource};
use gastrak::SnapshotPublisher;
use chrono::{TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const STORE1_ROW: &str = "1600000000,1,Store1,47.61,-122.33,3.99,,";
pub const STORE2_ROW: &str = "1600000000,2,Store2,47.62,-122.34,,,4.49";

/// Source files living in a temporary directory
pub struct TestSources {
    pub dir: TempDir,
    pub current_path: PathBuf,
    pub history_path: PathBuf,
}

impl TestSources {
    /// Create a directory with a current and a history CSV
    pub fn new(current: &[&str], history: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let current_path = dir.path().join("current.csv");
        let history_path = dir.path().join("history.csv");
        write_rows(&current_path, current);
        write_rows(&history_path, history);

        Self {
            dir,
            current_path,
            history_path,
        }
    }

    pub fn current(&self) -> Arc<dyn RecordSource> {
        Arc::new(CsvSource::new(&self.current_path))
    }

    pub fn history(&self) -> Arc<dyn RecordSource> {
        Arc::new(CsvSource::new(&self.history_path))
    }

    pub fn write_current(&self, rows: &[&str]) {
        write_rows(&self.current_path, rows);
    }

    pub fn remove_current(&self) {
        std::fs::remove_file(&self.current_path).expect("Failed to remove current file");
    }
}

/// Write rows as a headerless CSV file
pub fn write_rows(path: &Path, rows: &[&str]) {
    let mut contents = rows.join("\n");
    if !rows.is_empty() {
        contents.push('\n');
    }
    std::fs::write(path, contents).expect("Failed to write rows");
}

/// Parse CSV-style lines into raw records
pub fn raw_records(lines: &[&str]) -> Vec<RawRecord> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let fields: Vec<String> = line.split(',').map(str::to_string).collect();
            let fields = fields.try_into().expect("test rows must have 8 fields");
            RawRecord::new(index + 1, fields)
        })
        .collect()
}

/// Snapshot built from in-memory lines
pub fn snapshot_from(current: &[&str], history: &[&str]) -> Snapshot {
    let current = build_records("current", &raw_records(current))
        .expect("Failed to build current records")
        .into_observations();
    let history = build_records("history", &raw_records(history))
        .expect("Failed to build history records")
        .into_observations();
    Snapshot::new(Utc.timestamp_opt(1_600_000_500, 0).unwrap(), current, history)
}

/// Application state over a fixed snapshot
pub fn app_state(snapshot: Snapshot, history_enabled: bool) -> AppState {
    AppState::new(
        Arc::new(SnapshotPublisher::new(snapshot)),
        47.6,
        -122.3,
        history_enabled,
    )
}

/// Sample history: two stations over three readings each
pub fn sample_history() -> Vec<&'static str> {
    vec![
        "1600000000,1,Store1,47.61,-122.33,3.99,,",
        "1600000000,2,Store2,47.62,-122.34,,,4.49",
        "1600086400,1,Store1,47.61,-122.33,4.09,4.59,",
        "1600086400,2,Store2,47.62,-122.34,,,4.39",
        "1600172800,1,Store1,47.61,-122.33,4.19,,",
        "1600172800,2,Store2,47.62,-122.34,3.89,,4.29",
    ]
}
