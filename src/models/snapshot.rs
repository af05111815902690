use super::Observation;
use chrono::{DateTime, Utc};

/// Immutable, fully loaded pair of observation sequences.
///
/// `generation` is zero until the snapshot is handed to a
/// [`SnapshotPublisher`](crate::publisher::SnapshotPublisher), which stamps it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub current: Vec<Observation>,
    pub history: Vec<Observation>,
}

impl Snapshot {
    pub fn new(loaded_at: DateTime<Utc>, current: Vec<Observation>, history: Vec<Observation>) -> Self {
        Self {
            generation: 0,
            loaded_at,
            current,
            history,
        }
    }

    pub fn series(&self, series: Series) -> &[Observation] {
        match series {
            Series::Current => &self.current,
            Series::History => &self.history,
        }
    }
}

/// Which of the two sequences of a snapshot to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Current,
    History,
}
