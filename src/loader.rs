//! Record store construction.
//!
//! Turns raw 8-field rows into [`Observation`]s, deduplicating stations so
//! every observation of one station within a load shares one `Arc<Station>`.

use crate::error::LoadError;
use crate::models::{Observation, Station};
use crate::source::{RawRecord, RecordSource, FIELD_NAMES};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Observations from one load plus the station dictionary they reference
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    observations: Vec<Observation>,
    stations: HashMap<i64, Arc<Station>>,
}

impl RecordSet {
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn into_observations(self) -> Vec<Observation> {
        self.observations
    }

    pub fn station(&self, id: i64) -> Option<&Arc<Station>> {
        self.stations.get(&id)
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }
}

/// Read every row of `source` and build a record set. All or nothing.
pub async fn load(source: &dyn RecordSource) -> Result<RecordSet, LoadError> {
    let rows = source.read_rows().await?;
    let records = build_records(&source.describe(), &rows)?;
    debug!(
        "Loaded {} observations for {} stations from {}",
        records.observations().len(),
        records.station_count(),
        source.describe()
    );
    Ok(records)
}

/// Parse rows into a record set.
///
/// The first row seen for a station id defines its name and coordinates.
/// Later rows with the same id reuse that station and are not checked
/// against it.
pub fn build_records(origin: &str, rows: &[RawRecord]) -> Result<RecordSet, LoadError> {
    let mut stations: HashMap<i64, Arc<Station>> = HashMap::new();
    let mut observations = Vec::with_capacity(rows.len());

    for record in rows {
        let parser = FieldParser { origin, record };

        let station_id = parser.integer(1)?;
        let station = match stations.get(&station_id) {
            Some(station) => Arc::clone(station),
            None => {
                let station = Arc::new(Station {
                    id: station_id,
                    name: record.fields[2].clone(),
                    latitude: parser.float(3)?,
                    longitude: parser.float(4)?,
                });
                stations.insert(station_id, Arc::clone(&station));
                station
            }
        };

        observations.push(Observation {
            timestamp: parser.timestamp(0)?,
            station,
            regular_price: parser.price(5)?,
            premium_price: parser.price(6)?,
            diesel_price: parser.price(7)?,
        });
    }

    Ok(RecordSet {
        observations,
        stations,
    })
}

struct FieldParser<'a> {
    origin: &'a str,
    record: &'a RawRecord,
}

impl FieldParser<'_> {
    fn malformed(&self, index: usize, reason: impl ToString) -> LoadError {
        LoadError::MalformedRecord {
            origin: self.origin.to_string(),
            row: self.record.row,
            field: FIELD_NAMES[index],
            reason: reason.to_string(),
        }
    }

    fn raw(&self, index: usize) -> &str {
        self.record.fields[index].trim()
    }

    fn integer(&self, index: usize) -> Result<i64, LoadError> {
        let raw = self.raw(index);
        raw.parse::<i64>()
            .map_err(|e| self.malformed(index, format!("{:?}: {}", raw, e)))
    }

    fn float(&self, index: usize) -> Result<f64, LoadError> {
        let raw = self.raw(index);
        let value = raw
            .parse::<f64>()
            .map_err(|e| self.malformed(index, format!("{:?}: {}", raw, e)))?;
        if !value.is_finite() {
            return Err(self.malformed(index, format!("{:?}: not a finite number", raw)));
        }
        Ok(value)
    }

    fn timestamp(&self, index: usize) -> Result<DateTime<Utc>, LoadError> {
        let secs = self.integer(index)?;
        Utc.timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| self.malformed(index, format!("{} is out of range", secs)))
    }

    /// Empty means absent. Zero is also absent: one of the output encodings
    /// cannot tell zero from unset.
    fn price(&self, index: usize) -> Result<Option<Decimal>, LoadError> {
        let raw = self.raw(index);
        if raw.is_empty() {
            return Ok(None);
        }

        let value = Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map_err(|e| self.malformed(index, format!("{:?}: {}", raw, e)))?;

        if value.is_sign_negative() && !value.is_zero() {
            return Err(self.malformed(index, format!("{:?}: negative price", raw)));
        }
        if value.is_zero() {
            return Ok(None);
        }
        Ok(Some(value.normalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: usize, fields: [&str; 8]) -> RawRecord {
        RawRecord::new(n, fields.map(str::to_string))
    }

    #[test]
    fn test_parses_all_fields() {
        let rows = vec![row(
            1,
            ["1600000000", "42", "Store1", "47.61", "-122.33", "3.99", "", "4.49"],
        )];

        let records = build_records("test", &rows).unwrap();
        assert_eq!(records.observations().len(), 1);

        let obs = &records.observations()[0];
        assert_eq!(obs.timestamp.timestamp(), 1_600_000_000);
        assert_eq!(obs.station.id, 42);
        assert_eq!(obs.station.name, "Store1");
        assert_eq!(obs.station.latitude, 47.61);
        assert_eq!(obs.station.longitude, -122.33);
        assert_eq!(obs.regular_price, Some(Decimal::new(399, 2)));
        assert_eq!(obs.premium_price, None);
        assert_eq!(obs.diesel_price, Some(Decimal::new(449, 2)));
    }

    #[test]
    fn test_station_dedup_shares_reference() {
        let rows = vec![
            row(1, ["1600000000", "42", "Store1", "47.6", "-122.3", "3.99", "", ""]),
            row(2, ["1600000060", "7", "Store7", "47.7", "-122.4", "3.89", "", ""]),
            row(3, ["1600000120", "42", "Renamed", "10.0", "10.0", "4.09", "", ""]),
        ];

        let records = build_records("test", &rows).unwrap();
        let obs = records.observations();

        assert!(Arc::ptr_eq(&obs[0].station, &obs[2].station));
        assert!(!Arc::ptr_eq(&obs[0].station, &obs[1].station));
        // First row wins; later rows are not re-validated
        assert_eq!(obs[2].station.name, "Store1");
        assert_eq!(obs[2].station.latitude, 47.6);
        assert_eq!(records.station_count(), 2);
        assert!(Arc::ptr_eq(records.station(42).unwrap(), &obs[0].station));
    }

    #[test]
    fn test_malformed_row_fails_whole_load() {
        let mut rows = Vec::new();
        for n in 1..=10 {
            let lat = if n == 5 { "north" } else { "47.6" };
            rows.push(RawRecord::new(
                n,
                [
                    "1600000000".to_string(),
                    n.to_string(),
                    format!("Store{}", n),
                    lat.to_string(),
                    "-122.3".to_string(),
                    "3.99".to_string(),
                    String::new(),
                    String::new(),
                ],
            ));
        }

        let err = build_records("test.csv", &rows).unwrap_err();
        match err {
            LoadError::MalformedRecord { row, field, .. } => {
                assert_eq!(row, 5);
                assert_eq!(field, "latitude");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_zero_and_empty_prices_are_absent() {
        let rows = vec![row(
            1,
            ["1600000000", "1", "Store1", "47.6", "-122.3", "0", "", "0.00"],
        )];

        let records = build_records("test", &rows).unwrap();
        let obs = &records.observations()[0];
        assert_eq!(obs.regular_price, None);
        assert_eq!(obs.premium_price, None);
        assert_eq!(obs.diesel_price, None);
    }

    #[test]
    fn test_negative_price_is_malformed() {
        let rows = vec![row(
            1,
            ["1600000000", "1", "Store1", "47.6", "-122.3", "-3.99", "", ""],
        )];

        let err = build_records("test", &rows).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_non_numeric_fields_are_malformed() {
        let bad_id = vec![row(1, ["1600000000", "x", "S", "47.6", "-122.3", "", "", ""])];
        let bad_time = vec![row(1, ["yesterday", "1", "S", "47.6", "-122.3", "", "", ""])];
        let bad_price = vec![row(1, ["1600000000", "1", "S", "47.6", "-122.3", "$3", "", ""])];

        assert!(build_records("t", &bad_id).unwrap_err().is_malformed());
        assert!(build_records("t", &bad_time).unwrap_err().is_malformed());
        assert!(build_records("t", &bad_price).unwrap_err().is_malformed());
    }

    #[test]
    fn test_preserves_row_order() {
        let rows = vec![
            row(1, ["1600000300", "2", "B", "1", "1", "3.00", "", ""]),
            row(2, ["1600000100", "1", "A", "1", "1", "3.10", "", ""]),
        ];

        let records = build_records("test", &rows).unwrap();
        let stamps: Vec<i64> = records
            .observations()
            .iter()
            .map(|o| o.timestamp.timestamp())
            .collect();
        assert_eq!(stamps, vec![1_600_000_300, 1_600_000_100]);
    }
}
